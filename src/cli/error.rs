//! CLI-level errors

use std::io;

use thiserror::Error;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("there is no device: {0}")]
    UnknownDevice(String),

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a spawn error with the command that failed.
    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownDevice(_) => crate::exitcode::DATAERR,
            CliError::Spawn { .. } => crate::exitcode::IOERR,
        }
    }
}
