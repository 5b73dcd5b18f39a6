//! Subprocess invocation for external media tools.
//!
//! The prober and remuxer depend on the `SubprocessRunner` trait rather than
//! a specific binary, so an in-process library could be substituted later
//! without changing the pipeline contract, and tests can use fakes.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout_secs}s")]
    TimedOut { program: String, timeout_secs: u64 },
}

/// Capability to run an external tool to completion, capturing its output.
#[async_trait]
pub trait SubprocessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as real child processes with a hard timeout. A hung tool is
/// killed so it cannot hold staged files indefinitely.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SubprocessRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the timed-out future must kill the child.
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::TimedOut {
                program: program.to_string(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| ToolError::Spawn {
                program: program.to_string(),
                source,
            })?;

        tracing::debug!(
            program = %program,
            success = output.status.success(),
            duration_ms = start.elapsed().as_millis() as u64,
            "tool invocation finished"
        );

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
