use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::utils::string::bytes_to_string;

/// Output of a command run with stdout/stderr captured
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CapturedOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: bytes_to_string(&output.stdout),
            stderr: bytes_to_string(&output.stderr),
            code: output.status.code(),
        }
    }
}

/// Map a process exit status to success/failure
pub fn is_success(status: &ExitStatus) -> bool {
    status.success()
}

/// Trait for running composed shell command lines
pub trait CommandRunner {
    /// Run a command with inherited stdio, returning whether it succeeded
    fn ex(&self, command: &str) -> Result<bool>;

    /// Run a command with stdout and stderr captured
    fn capture(&self, command: &str) -> Result<CapturedOutput>;
}

/// Runs command lines through `sh -c` on the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    fn shell(command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

impl CommandRunner for ShellRunner {
    fn ex(&self, command: &str) -> Result<bool> {
        tracing::debug!(command, "executing");
        let status = Self::shell(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute shell command: {}", command))?;
        Ok(is_success(&status))
    }

    fn capture(&self, command: &str) -> Result<CapturedOutput> {
        tracing::debug!(command, "executing (captured)");
        let output = Self::shell(command)
            .stdout(Stdio::piped()) // Capture output so it can be parsed
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute shell command: {}", command))?;
        Ok(output.into())
    }
}
