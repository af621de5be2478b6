//! Process manager - spawning and one-shot runs

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    child::{ManagedChild, ProcessOutput},
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// Spawns external tools with piped stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessManager;

impl ProcessManager {
    /// Create new process manager
    pub fn new() -> Self {
        Self
    }

    /// Spawn a managed process
    ///
    /// Stdin, stdout and stderr are always piped. The child is killed if the
    /// returned handle is dropped while it is still running.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Examples
    /// ```no_run
    /// use rustcomplete_process::{ProcessManager, ProcessConfig};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = ProcessManager::new();
    /// let config = ProcessConfig::new("echo").args(["hello"]);
    /// let child = manager.spawn(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(&self, config: ProcessConfig) -> Result<ManagedChild> {
        debug!(
            command = %config.command,
            args = ?config.args,
            cwd = ?config.working_dir,
            "Spawning process"
        );

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        if let Some(ref dir) = config.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ProcessError::from_spawn(&config.command, e))?;

        info!(pid = ?child.id(), command = %config.command, "Process spawned");

        Ok(ManagedChild::new(child, config))
    }

    /// Spawn a process, feed it `input`, and collect its output
    ///
    /// # Examples
    /// ```no_run
    /// use rustcomplete_process::{ProcessManager, ProcessConfig};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ProcessConfig::new("rustfmt").timeout_ms(2_000);
    /// let output = ProcessManager::new().run(config, b"fn main(){}").await?;
    /// println!("{}", output.stdout_lossy());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, config: ProcessConfig, input: &[u8]) -> Result<ProcessOutput> {
        let mut child = self.spawn(config)?;
        child.communicate(input).await
    }

    /// Force-kill a process
    pub async fn kill(&self, mut child: ManagedChild) -> Result<()> {
        child.kill().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_echo() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("echo").args(["hello"]);

        let child = manager.spawn(config).unwrap();
        assert!(child.pid() > 0);
    }

    #[tokio::test]
    async fn test_kill() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep").args(["10"]);

        let child = manager.spawn(config).unwrap();
        manager.kill(child).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("definitely-not-a-real-tool-4b1c");

        let err = manager.run(config, b"").await.unwrap_err();
        assert!(matches!(err, ProcessError::NotInstalled { .. }));
    }

    #[tokio::test]
    async fn test_run_in_working_dir_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessConfig::new("sh")
            .args(["-c", "pwd; echo $RUSTCOMPLETE_TEST_VAR"])
            .working_dir(dir.path())
            .env("RUSTCOMPLETE_TEST_VAR", "present")
            .timeout_ms(5_000);

        let output = ProcessManager::new().run(config, b"").await.unwrap();
        let stdout = output.stdout_lossy();
        let mut lines = stdout.lines();

        let cwd = std::path::PathBuf::from(lines.next().unwrap());
        assert_eq!(
            cwd.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert_eq!(lines.next(), Some("present"));
    }
}
