//! Command runners - how step commands reach the outside world

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Error types for command execution
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

/// Captured result of one command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code (-1 when terminated by signal)
    pub exit_code: i32,

    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running step commands - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its output
    async fn run(
        &self,
        command: &str,
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput, RunnerError>;
}

/// Runs commands through the shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Shell executable (e.g., "sh", "/bin/bash")
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    pub fn with_shell(shell: String) -> Self {
        Self { shell }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput, RunnerError> {
        debug!("Spawning shell command: {}", command);

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .envs(env)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RunnerError::Spawn(e.to_string()))?;

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code != 0 {
            warn!(
                "Command exited with code {}: {}",
                exit_code,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Prints rendered commands instead of executing them (dry runs)
#[derive(Debug, Clone, Default)]
pub struct EchoRunner;

#[async_trait]
impl CommandRunner for EchoRunner {
    async fn run(
        &self,
        command: &str,
        _env: &HashMap<String, String>,
    ) -> Result<CommandOutput, RunnerError> {
        info!("[dry-run] {}", command);

        Ok(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_captures_stdout() {
        let runner = ShellRunner::new();
        let output = runner.run("printf hello", &HashMap::new()).await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "hello");
    }

    #[tokio::test]
    async fn test_shell_runner_nonzero_exit() {
        let runner = ShellRunner::new();
        let output = runner.run("exit 3", &HashMap::new()).await.unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn test_shell_runner_pins_environment() {
        let runner = ShellRunner::new();

        let mut env = HashMap::new();
        env.insert("RELGATE_TEST_PIN".to_string(), "pinned".to_string());

        let output = runner
            .run("printf \"$RELGATE_TEST_PIN\"", &env)
            .await
            .unwrap();
        assert_eq!(output.stdout, "pinned");
    }

    #[tokio::test]
    async fn test_shell_runner_invalid_shell() {
        let runner = ShellRunner::with_shell("nonexistent-shell-binary".to_string());
        let result = runner.run("true", &HashMap::new()).await;
        assert!(matches!(result, Err(RunnerError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_echo_runner_never_executes() {
        let runner = EchoRunner;
        let output = runner
            .run("twine upload dist/*.whl", &HashMap::new())
            .await
            .unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());
    }
}
