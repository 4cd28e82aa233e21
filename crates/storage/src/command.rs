//! Shell command execution.
//!
//! Commands run via `sh -c` and are awaited to completion; output is
//! captured whole.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::StorageError;

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr, as one block of text.
    pub fn text(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout.trim_end_matches('\n'), self.stderr)
        }
    }
}

/// Runs a complete command line.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn invoke(&self, command: &str) -> Result<CommandOutput, StorageError>;
}

/// Runs commands through `/bin/sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn invoke(&self, command: &str) -> Result<CommandOutput, StorageError> {
        debug!(command = command, "executing shell command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| StorageError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success() {
            debug!(exit_code = ?result.exit_code, "command returned non-zero exit code");
        }
        Ok(result)
    }
}
