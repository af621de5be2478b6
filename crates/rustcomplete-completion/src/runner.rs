//! racer invocation
//!
//! Each request spawns a fresh racer process on the runtime, pipes the buffer
//! into it, and kills it if it outlives its deadline. Failures never reach the
//! caller as errors: they are logged and surface as an empty result set.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustcomplete_config::SettingsStore;
use rustcomplete_process::{ProcessConfig, ProcessManager};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{CompletionError, CompletionResult};
use crate::locator::ProjectLocator;
use crate::parser::{parse_output, STDIN_PATH};
use crate::search_path::{build_search_path, RUST_SRC_PATH};
use crate::types::{BufferSnapshot, MatchResult, Position, RacerCommand};

/// One racer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RacerRequest {
    /// Subcommand to run
    pub command: RacerCommand,
    /// File backing the buffer
    pub file_name: Option<PathBuf>,
    /// Buffer text piped to racer
    pub content: String,
    /// 0-based cursor position
    pub position: Position,
    /// Deadline override; the settings timeout applies when `None`
    pub timeout: Option<Duration>,
}

impl RacerRequest {
    /// Build a request from an editor snapshot
    pub fn new(command: RacerCommand, snapshot: &BufferSnapshot) -> Self {
        Self {
            command,
            file_name: snapshot.file_name.clone(),
            content: snapshot.content.clone(),
            position: snapshot.cursor,
            timeout: None,
        }
    }

    /// Override the settings timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `<subcommand> <row> <col> /dev/stdin`, with racer's 1-based row
    pub fn args(&self) -> Vec<String> {
        vec![
            self.command.as_str().to_string(),
            (self.position.line + 1).to_string(),
            self.position.column.to_string(),
            STDIN_PATH.to_string(),
        ]
    }
}

/// Runs racer requests on a tokio runtime
#[derive(Clone)]
pub struct RacerRunner {
    settings: Arc<SettingsStore>,
    locator: Arc<ProjectLocator>,
    processes: ProcessManager,
    handle: Handle,
}

impl RacerRunner {
    /// Create a runner spawning its work onto `handle`
    pub fn new(settings: Arc<SettingsStore>, locator: Arc<ProjectLocator>, handle: Handle) -> Self {
        Self {
            settings,
            locator,
            processes: ProcessManager::new(),
            handle,
        }
    }

    /// Run `request` in the background and hand the results to `callback`
    ///
    /// The callback runs exactly once, on a runtime worker, with the final
    /// (possibly empty) results. Safe to call from threads outside the
    /// runtime.
    pub fn run<F>(&self, request: RacerRequest, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Vec<MatchResult>) + Send + 'static,
    {
        let runner = self.clone();
        self.handle.spawn(async move {
            let results = runner.query(&request).await;
            callback(results);
        })
    }

    /// Run `request` and wait for its results, logging any failure
    pub async fn query(&self, request: &RacerRequest) -> Vec<MatchResult> {
        match self.try_query(request).await {
            Ok(results) => results,
            Err(CompletionError::ToolFailed {
                command,
                code,
                stdout,
                stderr,
            }) => {
                warn!(
                    command = %command,
                    code = ?code,
                    stdout = %stdout.trim(),
                    stderr = %stderr.trim(),
                    "racer failed"
                );
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "racer request produced no results");
                Vec::new()
            }
        }
    }

    /// Run `request`, surfacing failures as errors
    pub async fn try_query(&self, request: &RacerRequest) -> CompletionResult<Vec<MatchResult>> {
        let settings = self.settings.current();

        let project_source = match request.file_name.as_deref() {
            Some(file) => self
                .locator
                .resolve(file)
                .await
                .source_dir()
                .map(Path::to_path_buf),
            None => None,
        };

        let search_path = build_search_path(
            std::env::var(RUST_SRC_PATH).ok().as_deref(),
            &settings.search_paths,
            project_source.as_deref(),
        );
        let timeout = request
            .timeout
            .unwrap_or_else(|| Duration::from_millis(settings.timeout_ms));

        let config = ProcessConfig::new(&settings.racer)
            .args(request.args())
            .env(RUST_SRC_PATH, search_path.as_str())
            .timeout(timeout);

        info!(command = %config.command_line(), rust_src_path = %search_path, "racer");

        let output = self
            .processes
            .run(config, request.content.as_bytes())
            .await
            .map_err(CompletionError::from_process)?;

        if output.timed_out {
            return Err(CompletionError::TimedOut {
                command: settings.racer.clone(),
                millis: timeout.as_millis() as u64,
            });
        }
        if !output.success() {
            return Err(CompletionError::ToolFailed {
                command: settings.racer.clone(),
                code: output.code(),
                stdout: output.stdout_lossy(),
                stderr: output.stderr_lossy(),
            });
        }

        let results = parse_output(
            &output.stdout_lossy(),
            request.command.with_snippet(),
            request.file_name.as_deref(),
        );
        debug!(command = %request.command, count = results.len(), "Parsed racer output");
        Ok(results)
    }
}
