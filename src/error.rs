//! Error types for bztj
//!
//! Exit codes:
//! - 0: success
//! - 2: user error (bad arguments, bad configuration, unusable input)
//! - 4: operation failed (I/O and serialization problems)

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Bug export document not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Malformed bug record: {0}")]
    MalformedRecord(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Exit code the process should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InputNotFound(_)
            | Error::MalformedRecord(_) => exit_codes::USER_ERROR,
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::OperationFailed(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
