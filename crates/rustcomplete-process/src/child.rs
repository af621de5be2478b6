//! Managed child process wrapper

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, warn};

use crate::{
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// How long pipes may stay open past the deadline
///
/// A killed wrapper script can leave its own children holding stdout and
/// stderr; their output is abandoned after this.
const PIPE_GRACE: Duration = Duration::from_millis(100);

/// Everything a finished (or killed) process left behind
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit status, `None` when the process was killed on its deadline
    pub status: Option<ExitStatus>,
    /// Captured stdout
    pub stdout: Vec<u8>,
    /// Captured stderr
    pub stderr: Vec<u8>,
    /// Whether the deadline elapsed and the process was killed
    pub timed_out: bool,
}

impl ProcessOutput {
    /// True when the process exited on its own with code 0
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.is_some_and(|status| status.success())
    }

    /// Exit code, if the process exited normally
    pub fn code(&self) -> Option<i32> {
        self.status.and_then(|status| status.code())
    }

    /// Stdout decoded as UTF-8, replacing invalid sequences
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded as UTF-8, replacing invalid sequences
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Wrapper around tokio::process::Child with lifecycle management
pub struct ManagedChild {
    /// Underlying tokio child process
    child: Child,
    /// Process configuration
    config: ProcessConfig,
    /// Process ID
    pid: u32,
}

impl ManagedChild {
    /// Create new managed child
    pub(crate) fn new(child: Child, config: ProcessConfig) -> Self {
        let pid = child.id().unwrap_or(0);
        Self { child, config, pid }
    }

    /// Get process ID
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get process configuration
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Check if process is still running
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Wait for process to exit, failing with [`ProcessError::Timeout`] past the deadline
    ///
    /// The process is left running on timeout; use [`ManagedChild::communicate`]
    /// when the deadline should kill it.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.child.wait())
                .await
                .map_err(|_| ProcessError::Timeout {
                    millis: timeout.as_millis() as u64,
                })?
                .map_err(Into::into),
            None => self.child.wait().await.map_err(Into::into),
        }
    }

    /// Force-kill the process and reap it
    pub async fn kill(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        debug!(pid = %self.pid, "Killing process");
        self.child
            .kill()
            .await
            .map_err(|e| ProcessError::KillFailed(e.to_string()))
    }

    /// Feed `input` to stdin, collect stdout and stderr, and wait for exit
    ///
    /// Stdin is closed once `input` has been written. All pipes are serviced
    /// concurrently so a chatty child never blocks on a full pipe. When the
    /// configured timeout elapses first the process is killed exactly once and
    /// the returned output has `timed_out` set. Either way this returns
    /// shortly after the deadline, even if descendants of the process keep
    /// its pipes open.
    pub async fn communicate(&mut self, input: &[u8]) -> Result<ProcessOutput> {
        let stdin = self.child.stdin.take();
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();
        let timeout = self.config.timeout;
        let pipes_deadline = timeout.map(|limit| Instant::now() + limit + PIPE_GRACE);
        let pid = self.pid;
        let child = &mut self.child;

        let feed = async move {
            let Some(mut stdin) = stdin else {
                return;
            };
            let written = match pipes_deadline {
                Some(deadline) => timeout_at(deadline, stdin.write_all(input))
                    .await
                    .unwrap_or_else(|_| Err(io::ErrorKind::TimedOut.into())),
                None => stdin.write_all(input).await,
            };
            if let Err(e) = written {
                // The child may exit without reading everything
                debug!(pid = %pid, error = %e, "Failed to write stdin");
            }
        };

        let wait = async move {
            let Some(limit) = timeout else {
                return child.wait().await.map(|status| (Some(status), false));
            };

            let exited = tokio::select! {
                status = child.wait() => Some(status),
                _ = sleep(limit) => None,
            };

            match exited {
                Some(status) => status.map(|status| (Some(status), false)),
                None => {
                    warn!(
                        pid = %pid,
                        timeout_ms = limit.as_millis() as u64,
                        "Process exceeded its deadline, killing"
                    );
                    if let Err(e) = child.kill().await {
                        warn!(pid = %pid, error = %e, "Failed to kill process");
                    }
                    Ok((None, true))
                }
            }
        };

        let (waited, (), stdout, stderr) = tokio::join!(
            wait,
            feed,
            drain(stdout, pipes_deadline, pid),
            drain(stderr, pipes_deadline, pid)
        );
        let (status, timed_out) = waited?;

        Ok(ProcessOutput {
            status,
            stdout: stdout?,
            stderr: stderr?,
            timed_out,
        })
    }
}

/// Read `pipe` to EOF, giving up at `deadline`
async fn drain<R>(pipe: Option<R>, deadline: Option<Instant>, pid: u32) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return Ok(buf);
    };

    let Some(deadline) = deadline else {
        pipe.read_to_end(&mut buf).await?;
        return Ok(buf);
    };

    let read = timeout_at(deadline, pipe.read_to_end(&mut buf)).await;
    match read {
        Ok(read) => {
            read?;
        }
        Err(_) => debug!(
            pid = %pid,
            bytes = buf.len(),
            "Pipe still open past the deadline, abandoning it"
        ),
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ProcessManager;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_is_running() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep").args(["1"]);

        let mut child = manager.spawn(config).unwrap();
        assert!(child.is_running());

        child.wait().await.unwrap();
        assert!(!child.is_running());
    }

    #[tokio::test]
    async fn test_communicate_round_trips_stdin() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("cat").timeout_ms(5_000);

        let mut child = manager.spawn(config).unwrap();
        let output = child.communicate(b"fn main() {}\n").await.unwrap();

        assert!(output.success());
        assert!(!output.timed_out);
        assert_eq!(output.stdout_lossy(), "fn main() {}\n");
    }

    #[tokio::test]
    async fn test_communicate_kills_on_deadline() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep").args(["10"]).timeout_ms(100);

        let started = Instant::now();
        let mut child = manager.spawn(config).unwrap();
        let output = child.communicate(b"").await.unwrap();

        assert!(output.timed_out);
        assert!(output.status.is_none());
        assert!(!output.success());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!child.is_running());
    }

    #[tokio::test]
    async fn test_deadline_holds_when_descendants_keep_pipes_open() {
        let manager = ProcessManager::new();
        // The trailing echo stops sh from exec'ing sleep, so the killed shell
        // leaves a sleeping child holding stdout and stderr
        let config = ProcessConfig::new("sh")
            .args(["-c", "sleep 3; echo done"])
            .timeout_ms(200);

        let started = Instant::now();
        let mut child = manager.spawn(config).unwrap();
        let output = child.communicate(b"").await.unwrap();

        assert!(output.timed_out);
        assert!(!output.success());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_stderr() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .timeout_ms(5_000);

        let mut child = manager.spawn(config).unwrap();
        let output = child.communicate(b"").await.unwrap();

        assert!(!output.success());
        assert_eq!(output.code(), Some(3));
        assert_eq!(output.stderr_lossy().trim(), "broken");
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep").args(["10"]).timeout_ms(50);

        let mut child = manager.spawn(config).unwrap();
        let err = child.wait().await.unwrap_err();
        assert!(matches!(err, ProcessError::Timeout { millis: 50 }));

        child.kill().await.unwrap();
        assert!(!child.is_running());
    }
}
