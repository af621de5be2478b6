//! Error types for process execution

use std::io;
use thiserror::Error;

/// Process execution errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be found on disk or in `PATH`
    #[error("Executable not found: {command}")]
    NotInstalled { command: String },

    /// Failed to spawn process for any other reason
    #[error("Failed to spawn {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Process timed out
    #[error("Process timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Failed to kill process
    #[error("Failed to kill process: {0}")]
    KillFailed(String),

    /// I/O failure while talking to a running process
    #[error("Process I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ProcessError {
    /// Classify a spawn failure, separating a missing executable from other errors
    pub fn from_spawn(command: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ProcessError::NotInstalled {
                command: command.to_string(),
            }
        } else {
            ProcessError::SpawnFailed {
                command: command.to_string(),
                source,
            }
        }
    }
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
