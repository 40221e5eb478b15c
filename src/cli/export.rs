//! Export command: milestone buckets to TaskJuggler task files

use std::path::PathBuf;

use serde::Serialize;

use crate::bug::BugExport;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{self, HumanOutput, OutputOptions};
use crate::task::{build_forest, Task};
use crate::tji;

/// Options for the export command
pub struct ExportOptions {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub milestones: Vec<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Export result for JSON output
#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub flags_file: String,
    pub project_file: String,
    pub milestones: Vec<MilestoneReport>,
}

/// Per-milestone document pair
#[derive(Debug, Serialize)]
pub struct MilestoneReport {
    pub milestone: String,
    pub resolved_file: String,
    pub resolved_tasks: usize,
    pub open_file: String,
    pub open_tasks: usize,
    pub warnings: usize,
}

/// Run the export command
pub fn run(opts: ExportOptions) -> Result<()> {
    // Milestone names become document file name prefixes.
    for milestone in &opts.milestones {
        if milestone.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "milestone name cannot be empty".to_string(),
            ));
        }
        if milestone.contains('/') || milestone.contains('\\') {
            return Err(Error::InvalidArgument(format!(
                "milestone name \"{milestone}\" cannot contain path separators"
            )));
        }
    }

    let config = Config::load_or_default(opts.config.as_deref())?;
    let export = BugExport::load(&opts.input)?;

    std::fs::create_dir_all(&opts.out_dir)?;

    // The flag and schema-extension documents are milestone-independent
    // and written once per invocation.
    super::write_document(&opts.out_dir.join(&config.export.flags_file), |out| {
        tji::write_flags(out)
    })?;
    super::write_document(&opts.out_dir.join(&config.export.project_file), |out| {
        tji::write_project_extensions(out)
    })?;

    let mut human = HumanOutput::new(format!(
        "Exported {} milestone(s) from {}",
        opts.milestones.len(),
        opts.input.display()
    ));
    human.push_summary("Output directory", opts.out_dir.display().to_string());

    let mut milestones = Vec::new();
    for milestone in &opts.milestones {
        let bucket = export.bucket(milestone);
        tracing::debug!(
            milestone = %milestone,
            resolved = bucket.resolved.len(),
            open = bucket.open.len(),
            "processing bucket"
        );

        // Resolved bugs render as a flat list of fixed-date milestones,
        // no hierarchy and no dependencies.
        let resolved: Vec<Task> = bucket
            .resolved
            .iter()
            .filter_map(|row| Task::from_resolved(row, &config))
            .collect();
        let resolved_file = format!("{milestone}_resolved_tasks.tji");
        super::write_document(&opts.out_dir.join(&resolved_file), |out| {
            tji::write_task_list(out, &resolved, &config)
        })?;

        let open: Vec<Task> = bucket
            .open
            .iter()
            .map(|row| Task::from_open(row, &config))
            .collect();
        let forest = build_forest(open, &export.dependencies);
        let open_file = format!("{milestone}_open_tasks.tji");
        let warnings = super::write_document(&opts.out_dir.join(&open_file), |out| {
            tji::write_task_list(out, &forest, &config)
        })?;

        for warning in &warnings {
            human.push_warning(warning.to_string());
        }

        let open_tasks: usize = forest.iter().map(Task::subtree_len).sum();
        human.push_detail(format!(
            "{resolved_file}: {} resolved task(s)",
            resolved.len()
        ));
        human.push_detail(format!("{open_file}: {open_tasks} open task(s)"));

        milestones.push(MilestoneReport {
            milestone: milestone.clone(),
            resolved_file,
            resolved_tasks: resolved.len(),
            open_file,
            open_tasks,
            warnings: warnings.len(),
        });
    }

    let report = ExportReport {
        input: opts.input,
        out_dir: opts.out_dir,
        flags_file: config.export.flags_file.clone(),
        project_file: config.export.project_file.clone(),
        milestones,
    };

    output::emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "export",
        &report,
        Some(&human),
    )
}
