//! Macros command: the date-macro include file

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{self, HumanOutput, OutputOptions};
use crate::tji;

/// Options for the macros command
pub struct MacrosOptions {
    pub out_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Macros result for JSON output
#[derive(Debug, Serialize)]
pub struct MacrosReport {
    pub path: PathBuf,
}

/// Run the macros command
pub fn run(opts: MacrosOptions) -> Result<()> {
    let config = Config::load_or_default(opts.config.as_deref())?;

    std::fs::create_dir_all(&opts.out_dir)?;
    let path = opts.out_dir.join(&config.export.macros_file);

    // Macros are anchored to the local wall clock, same as the
    // schedules they end up in.
    let now = Local::now().naive_local();
    super::write_document(&path, |out| tji::write_date_macros(out, now))?;

    let mut human = HumanOutput::new("Wrote date macros");
    human.push_summary("Document", path.display().to_string());

    let report = MacrosReport { path };

    output::emit_success(
        OutputOptions {
            json: opts.json,
            quiet: opts.quiet,
        },
        "macros",
        &report,
        Some(&human),
    )
}
