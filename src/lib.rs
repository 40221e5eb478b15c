//! bztj - Bugzilla to TaskJuggler exporter
//!
//! Transforms a flat, dependency-annotated bug export into TaskJuggler
//! include files. Grouping bugs adopt the bugs blocking them as child
//! tasks, and dependency references are rewritten as paths relative to
//! each task's position in the resulting hierarchy.

pub mod bug;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod refname;
pub mod task;
pub mod tji;

pub use error::{Error, Result};
