//! TaskJuggler document serialization
//!
//! Writes task-list include files plus the fixed flag, schema-extension
//! and date-macro documents. Nesting uses two-space indent per level,
//! titles and attribute values sit between double quotes.

use std::fmt;
use std::io::Write;

use chrono::{Duration, NaiveDateTime};

use crate::config::Config;
use crate::error::Result;
use crate::refname::relative_name;
use crate::task::{Schedule, Task};

/// Extension fields attached to every exported task
const TASK_EXTENSIONS: [(&str, &str); 8] = [
    ("text", "BugID"),
    ("text", "BugURL"),
    ("reference", "BugRef"),
    ("text", "Priority"),
    ("text", "Product"),
    ("text", "Severity"),
    ("text", "Keywords"),
    ("text", "AssignedTo"),
];

/// A grouping task that ended up with nothing to group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyGroupWarning {
    pub bug_id: u32,
    pub milestone: String,
}

impl fmt::Display for EmptyGroupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "META bug {} has no open dependencies in milestone \"{}\"",
            self.bug_id, self.milestone
        )
    }
}

/// Write one task-list document
///
/// Top-level tasks appear in forest order, children in adoption order.
/// Returns a warning for every grouping task serialized without
/// children.
pub fn write_task_list<W: Write>(
    out: &mut W,
    forest: &[Task],
    config: &Config,
) -> Result<Vec<EmptyGroupWarning>> {
    let mut warnings = Vec::new();
    for task in forest {
        write_task(out, task, forest, 0, config, &mut warnings)?;
    }
    Ok(warnings)
}

fn write_task<W: Write>(
    out: &mut W,
    task: &Task,
    root: &[Task],
    depth: usize,
    config: &Config,
    warnings: &mut Vec<EmptyGroupWarning>,
) -> Result<()> {
    let indent = "  ".repeat(depth);
    let url = config.bug_url(task.bug_id);

    writeln!(out, "{indent}task bug_{} \"{}\" {{", task.bug_id, task.name)?;
    writeln!(out, "{indent}  BugID \"{}\"", task.bug_id)?;
    writeln!(out, "{indent}  BugURL \"{url}\"")?;
    writeln!(out, "{indent}  BugRef \"{url}\" {{")?;
    writeln!(out, "{indent}    label \"{}\"", task.bug_id)?;
    writeln!(out, "{indent}  }}")?;

    // Milestones never carry dependencies; for everything else, edges
    // whose target is nowhere in the forest are silently dropped.
    if matches!(task.schedule, Schedule::Open { .. }) {
        let paths: Vec<String> = task
            .depends
            .iter()
            .filter_map(|id| relative_name(root, *id, depth))
            .collect();
        if !paths.is_empty() {
            writeln!(out, "{indent}  depends {}", paths.join(","))?;
        }
    }

    if task.is_group {
        if task.children.is_empty() {
            warnings.push(EmptyGroupWarning {
                bug_id: task.bug_id,
                milestone: task.milestone.clone(),
            });
        }
        for child in &task.children {
            write_task(out, child, root, depth + 1, config, warnings)?;
        }
    } else {
        writeln!(out, "{indent}  Priority \"{}\"", task.bz_priority)?;
        writeln!(out, "{indent}  Product \"{}\"", task.bz_product)?;
        writeln!(out, "{indent}  Severity \"{}\"", task.bz_severity)?;
        writeln!(out, "{indent}  Keywords \"{}\"", task.bz_keywords)?;
        writeln!(out, "{indent}  AssignedTo \"{}\"", task.bz_assigned_to)?;

        match &task.schedule {
            Schedule::Milestone { end } => {
                writeln!(out, "{indent}  milestone")?;
                writeln!(out, "{indent}  flags flagIsResolved")?;
                writeln!(out, "{indent}  end {}", end.format("%Y-%m-%d-%H:%M:%S"))?;
            }
            Schedule::Open { effort, weight, .. } => {
                writeln!(out, "{indent}  allocate {}", task.resource)?;
                writeln!(out, "{indent}  effort {effort}")?;
                writeln!(out, "{indent}  priority {weight}")?;
            }
        }

        if task.bz_severity == "enhancement" {
            writeln!(out, "{indent}  flags flagIsEnhancement")?;
        }
        if let Schedule::Open {
            needs_estimate,
            needs_priority,
            ..
        } = &task.schedule
        {
            if *needs_estimate {
                writeln!(out, "{indent}  flags flagEstimateNeeded")?;
            }
            if *needs_priority {
                writeln!(out, "{indent}  flags flagPriorityNeeded")?;
            }
        }
    }

    writeln!(out, "{indent}}}")?;
    Ok(())
}

/// Write the flag-declaration document
pub fn write_flags<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "# Written by bztj")?;
    writeln!(out, "# Should be included at main level after the project section")?;
    writeln!(out, "flags flagIsEnhancement")?;
    writeln!(out, "flags flagIsResolved")?;
    writeln!(out, "flags flagEstimateNeeded")?;
    writeln!(out, "flags flagPriorityNeeded")?;
    Ok(())
}

/// Write the task schema-extension document
pub fn write_project_extensions<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "# Written by bztj")?;
    writeln!(out, "# Should be included inside the project section")?;
    for (kind, name) in TASK_EXTENSIONS {
        writeln!(out, "extend task {{")?;
        writeln!(out, "  {kind} {name} \"{name}\"")?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Write the date-macro document
///
/// The PLUS_N_MONTHS macros step in 30-day increments from today.
pub fn write_date_macros<W: Write>(out: &mut W, now: NaiveDateTime) -> Result<()> {
    writeln!(out, "# DATETIME_NOW_LABEL is in human readable format")?;
    writeln!(
        out,
        "macro DATETIME_NOW_LABEL [{}]",
        now.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(out, "# DATETIME_NOW is in taskjuggler format")?;
    writeln!(out, "macro DATETIME_NOW [{}]", now.format("%Y-%m-%d-%H:%M:%S"))?;

    let today = now.date();
    writeln!(out, "macro DATE_TODAY [{}]", today.format("%Y-%m-%d"))?;

    let mut date = today;
    for months in 1..=12u32 {
        date = date + Duration::days(30);
        let plural = if months > 1 { "S" } else { "" };
        writeln!(
            out,
            "macro DATE_TODAY_PLUS_{months}_MONTH{plural} [{}]",
            date.format("%Y-%m-%d")
        )?;
    }
    Ok(())
}
