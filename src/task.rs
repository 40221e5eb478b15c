//! Task model and hierarchy construction
//!
//! Flat bug rows become TaskJuggler tasks. Grouping bugs (summary
//! prefixed with the configured meta marker) adopt the bugs blocking
//! them as direct children, producing the forest the serializer walks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::bug::{BugRow, Dependency};
use crate::config::Config;

/// Scheduling half of a task
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    /// Already resolved, rendered as a fixed-date milestone
    Milestone { end: DateTime<Utc> },

    /// Still open, rendered as a schedulable task
    Open {
        effort: String,
        weight: u32,
        needs_estimate: bool,
        needs_priority: bool,
    },
}

/// One TaskJuggler task derived from a bug row
#[derive(Debug, Clone)]
pub struct Task {
    pub bug_id: u32,

    /// Display title, quote characters already sanitized
    pub name: String,

    /// Milestone bucket the task belongs to
    pub milestone: String,

    pub bz_priority: String,
    pub bz_product: String,
    pub bz_severity: String,
    pub bz_keywords: String,

    /// Simplified assignee login, dots and mail domain removed
    pub bz_assigned_to: String,

    /// Resource the task is allocated to, same simplification
    pub resource: String,

    pub schedule: Schedule,

    /// Grouping tasks adopt children and carry no schedule of their own
    pub is_group: bool,

    pub children: Vec<Task>,

    /// Ids of bugs this task depends on, resolved at serialization time
    pub depends: Vec<u32>,
}

impl Task {
    /// Build a milestone task from a resolved bug row
    ///
    /// Returns `None` for grouping bugs, which are dropped from the
    /// resolved bucket, and for rows missing their resolution time.
    pub fn from_resolved(row: &BugRow, config: &Config) -> Option<Self> {
        if row.summary.starts_with(&config.export.meta_prefix) {
            return None;
        }
        let end = row.resolved_at?;
        let assignee = simplify_login(&row.assigned_to);

        Some(Self {
            bug_id: row.bug_id,
            name: sanitize_title(&row.summary),
            milestone: row.target_milestone.clone(),
            bz_priority: row.priority.clone(),
            bz_product: row.product.clone(),
            bz_severity: row.severity.clone(),
            bz_keywords: row.keywords.clone(),
            bz_assigned_to: assignee.clone(),
            resource: assignee,
            schedule: Schedule::Milestone { end },
            is_group: false,
            children: Vec::new(),
            depends: Vec::new(),
        })
    }

    /// Build a schedulable task from an open bug row
    pub fn from_open(row: &BugRow, config: &Config) -> Self {
        let (summary, is_group) = match row.summary.strip_prefix(&config.export.meta_prefix) {
            Some(stripped) => (stripped, true),
            None => (row.summary.as_str(), false),
        };

        let needs_priority = row.priority == config.export.unprioritized;
        let (effort, needs_estimate) = if row.remaining_time > 0.0 {
            (effort_hours(row.remaining_time), false)
        } else if row.estimated_time > 0.0 {
            (effort_hours(row.estimated_time), false)
        } else {
            (config.export.default_effort.clone(), true)
        };
        let assignee = simplify_login(&row.assigned_to);

        Self {
            bug_id: row.bug_id,
            name: sanitize_title(summary),
            milestone: row.target_milestone.clone(),
            bz_priority: row.priority.clone(),
            bz_product: row.product.clone(),
            bz_severity: row.severity.clone(),
            bz_keywords: row.keywords.clone(),
            bz_assigned_to: assignee.clone(),
            resource: assignee,
            schedule: Schedule::Open {
                effort,
                weight: config.weight_for(&row.priority),
                needs_estimate,
                needs_priority,
            },
            is_group,
            children: Vec::new(),
            depends: Vec::new(),
        }
    }

    /// Number of tasks in this subtree, the task itself included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Task::subtree_len).sum::<usize>()
    }
}

/// Titles are emitted between double quotes, so the title itself must
/// not contain any.
fn sanitize_title(summary: &str) -> String {
    summary.replace('"', "'")
}

/// `jane.doe@example.com` becomes `janedoe`
fn simplify_login(login: &str) -> String {
    let local = login.split('@').next().unwrap_or(login);
    local.replace('.', "")
}

/// TaskJuggler wants `8.0h` rather than `8h`
fn effort_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.1}h")
    } else {
        format!("{hours}h")
    }
}

/// Turn a flat task list plus blocker edges into a forest.
///
/// Tasks are visited in input order. A grouping task adopts each of its
/// blockers that is still in the top-level sequence, moving it into its
/// children; blockers already adopted elsewhere (or absent) are dropped
/// without error, so adoption is first-come. Every other task keeps its
/// full edge list in `depends`, target existence is checked when the
/// reference is resolved, not here.
pub fn build_forest(tasks: Vec<Task>, edges: &[Dependency]) -> Vec<Task> {
    let mut blockers: HashMap<u32, Vec<u32>> = HashMap::new();
    for edge in edges {
        blockers.entry(edge.blocked).or_default().push(edge.depends_on);
    }

    let order: Vec<u32> = tasks.iter().map(|task| task.bug_id).collect();
    let mut forest = tasks;

    for bug_id in order {
        let Some(blocker_ids) = blockers.get(&bug_id) else {
            continue;
        };
        // The task may already sit below a group by the time its own
        // edges are processed.
        let Some(is_group) = find(&forest, bug_id).map(|task| task.is_group) else {
            continue;
        };
        for &blocker in blocker_ids {
            if is_group {
                // A group cannot adopt itself.
                if blocker == bug_id {
                    continue;
                }
                let Some(position) = forest.iter().position(|task| task.bug_id == blocker)
                else {
                    continue;
                };
                let child = forest.remove(position);
                if let Some(group) = find_mut(&mut forest, bug_id) {
                    group.children.push(child);
                }
            } else if let Some(task) = find_mut(&mut forest, bug_id) {
                task.depends.push(blocker);
            }
        }
    }

    forest
}

fn find(tasks: &[Task], bug_id: u32) -> Option<&Task> {
    for task in tasks {
        if task.bug_id == bug_id {
            return Some(task);
        }
        if let Some(found) = find(&task.children, bug_id) {
            return Some(found);
        }
    }
    None
}

fn find_mut(tasks: &mut [Task], bug_id: u32) -> Option<&mut Task> {
    for task in tasks.iter_mut() {
        if task.bug_id == bug_id {
            return Some(task);
        }
        if let Some(found) = find_mut(&mut task.children, bug_id) {
            return Some(found);
        }
    }
    None
}
