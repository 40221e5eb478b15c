//! Command-line interface for bztj
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

mod export;
mod macros;

/// bztj - Bugzilla to TaskJuggler exporter
///
/// Turns a flat Bugzilla bug export into TaskJuggler include files.
/// Grouping bugs adopt the bugs blocking them as subtasks, and
/// dependencies are written as references relative to each task's
/// position in that hierarchy.
#[derive(Parser, Debug)]
#[command(name = "bztj")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./bztj.toml)
    #[arg(short, long, global = true, env = "BZTJ_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export milestones to TaskJuggler task files
    Export {
        /// Bug export document (JSON)
        #[arg(short, long, env = "BZTJ_INPUT")]
        input: std::path::PathBuf,

        /// Directory the documents are written to
        #[arg(long, default_value = ".")]
        out_dir: std::path::PathBuf,

        /// Milestones to export, one pair of task files each
        #[arg(required = true)]
        milestones: Vec<String>,
    },

    /// Write the date-macro include file
    Macros {
        /// Directory the document is written to
        #[arg(long, default_value = ".")]
        out_dir: std::path::PathBuf,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Export {
                input,
                out_dir,
                milestones,
            } => export::run(export::ExportOptions {
                input,
                out_dir,
                milestones,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Macros { out_dir } => macros::run(macros::MacrosOptions {
                out_dir,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Create a document, run the writer against a buffered handle and
/// flush before returning.
pub(crate) fn write_document<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T>,
) -> Result<T> {
    let file = File::create(path).map_err(|err| {
        Error::OperationFailed(format!("cannot create {}: {err}", path.display()))
    })?;
    let mut out = BufWriter::new(file);
    let value = write(&mut out)?;
    out.flush().map_err(|err| {
        Error::OperationFailed(format!("cannot write {}: {err}", path.display()))
    })?;
    Ok(value)
}
