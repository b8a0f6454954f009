//! CLI errors and their exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: config error (invalid field configuration)
//! - 11: I/O error (snapshot write)
//! - 12: input error (bad size or theme argument)
//! - 13: serialization error

use backdrop_core::BackdropError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    /// The field configuration was rejected.
    Config(BackdropError),
    /// Writing output failed.
    Io(String),
    /// A command-line value could not be understood.
    Input(String),
    /// JSON (de)serialization failed.
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<BackdropError> for CliError {
    fn from(e: BackdropError) -> Self {
        match e {
            BackdropError::Io(msg) => CliError::Io(msg),
            BackdropError::Serialization(msg) => CliError::Serialization(msg),
            other => CliError::Config(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
