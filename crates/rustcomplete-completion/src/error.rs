//! Error types for completion requests

use rustcomplete_config::ConfigError;
use rustcomplete_process::ProcessError;
use thiserror::Error;

/// Errors raised while talking to racer or cargo
///
/// None of these reach the editor: the runner and locator log them and fall
/// back to "no completions" / "no source path".
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Unable to find {command} executable (check settings)")]
    ToolNotInstalled { command: String },

    #[error("{command} failed with exit code {code:?}")]
    ToolFailed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{command} killed after {millis}ms")]
    TimedOut { command: String, millis: u64 },

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for completion operations
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

impl CompletionError {
    /// Lift a process error, naming the executable when it is missing
    pub fn from_process(err: ProcessError) -> Self {
        match err {
            ProcessError::NotInstalled { command } => CompletionError::ToolNotInstalled { command },
            other => CompletionError::Process(other),
        }
    }
}
