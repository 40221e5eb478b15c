//! Bug export documents
//!
//! Input to the exporter is a JSON document holding the flat bug rows
//! and the dependency edges between them, as dumped from a Bugzilla
//! installation.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One bug row from the tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugRow {
    /// Numeric bug id, unique within a document
    pub bug_id: u32,

    /// One-line summary
    pub summary: String,

    /// Priority code, e.g. `P1`
    pub priority: String,

    /// Product the bug is filed against
    pub product: String,

    /// Severity, e.g. `normal` or `enhancement`
    pub severity: String,

    /// Space-separated keyword list
    #[serde(default)]
    pub keywords: String,

    /// Login of the assignee
    pub assigned_to: String,

    /// Milestone the bug is targeted at
    pub target_milestone: String,

    /// When the bug was resolved, absent for open bugs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Original estimate in hours
    #[serde(default)]
    pub estimated_time: f64,

    /// Remaining work in hours
    #[serde(default)]
    pub remaining_time: f64,
}

impl BugRow {
    /// Whether the bug has been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// One dependency edge: `blocked` cannot start until `depends_on` is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Bug that is blocked
    pub blocked: u32,

    /// Bug that must be finished first
    #[serde(alias = "dependson")]
    pub depends_on: u32,
}

/// A full bug export document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugExport {
    #[serde(default)]
    pub bugs: Vec<BugRow>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl BugExport {
    /// Load a bug export document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::InputNotFound(path.to_path_buf())
            } else {
                Error::Io(err)
            }
        })?;

        let export: BugExport = serde_json::from_str(&content)
            .map_err(|err| Error::MalformedRecord(format!("{}: {err}", path.display())))?;
        export.validate(path)?;

        tracing::debug!(
            bugs = export.bugs.len(),
            dependencies = export.dependencies.len(),
            "loaded bug export"
        );
        Ok(export)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let mut seen = HashSet::new();
        for bug in &self.bugs {
            if !seen.insert(bug.bug_id) {
                return Err(Error::MalformedRecord(format!(
                    "{}: duplicate bug id {}",
                    path.display(),
                    bug.bug_id
                )));
            }
        }
        Ok(())
    }

    /// Split the rows targeted at one milestone into resolved and open
    /// buckets, preserving document order within each
    pub fn bucket(&self, milestone: &str) -> Bucket {
        let mut bucket = Bucket {
            milestone: milestone.to_string(),
            resolved: Vec::new(),
            open: Vec::new(),
        };
        for bug in &self.bugs {
            if bug.target_milestone != milestone {
                continue;
            }
            if bug.is_resolved() {
                bucket.resolved.push(bug.clone());
            } else {
                bucket.open.push(bug.clone());
            }
        }
        bucket
    }
}

/// Bugs of one milestone, split by resolution state
#[derive(Debug, Clone)]
pub struct Bucket {
    pub milestone: String,
    pub resolved: Vec<BugRow>,
    pub open: Vec<BugRow>,
}
