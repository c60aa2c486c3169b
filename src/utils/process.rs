//! Builder for running the external tools the installer relies on
//!
//! Extraction and `PATH` edits are delegated to tools that ship with the
//! operating system (`gunzip`, `powershell`). [`ToolCommand`] resolves the
//! tool with `which`, runs it to completion and turns a non-zero exit status
//! into [`InstallerError::ToolFailed`] carrying the exit code.

use crate::core::InstallerError;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Upper bound on a single tool run; extracting a ~100MB archive is well under it.
const TOOL_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ToolCommand {
    tool: String,
    args: Vec<OsString>,
    context: Option<String>,
}

impl ToolCommand {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: Vec::new(),
            context: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Run the tool and wait for it to exit. Output is only logged.
    pub async fn execute(self) -> Result<()> {
        let program = which::which(&self.tool).map_err(|_| InstallerError::ToolNotFound {
            tool: self.tool.clone(),
        })?;

        let rendered_args =
            self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect::<Vec<_>>().join(" ");
        match &self.context {
            Some(ctx) => {
                tracing::debug!(target: "tool", "({ctx}) Executing: {} {rendered_args}", self.tool)
            }
            None => tracing::debug!(target: "tool", "Executing: {} {rendered_args}", self.tool),
        }

        let mut cmd = Command::new(&program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(TOOL_TIMEOUT, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    target: "tool",
                    "{} timed out after {} seconds",
                    self.tool,
                    TOOL_TIMEOUT.as_secs()
                );
                return Err(InstallerError::ToolFailed {
                    tool: self.tool,
                    code: -1,
                }
                .into());
            }
        }
        .with_context(|| format!("Failed to execute {} {rendered_args}", self.tool))?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::debug!(
                target: "tool",
                "{} failed with exit code {:?}: {}",
                self.tool,
                output.status.code(),
                stderr.trim()
            );
            return Err(InstallerError::ToolFailed {
                tool: self.tool,
                // None means the tool was killed by a signal
                code: output.status.code().unwrap_or(-1),
            }
            .into());
        }

        tracing::trace!(
            target: "tool",
            "{} output: {}",
            self.tool,
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    async fn test_missing_tool() {
        let err = ToolCommand::new("definitely-not-a-real-tool-4242").execute().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<InstallerError>(),
            Some(&InstallerError::ToolNotFound {
                tool: "definitely-not-a-real-tool-4242".to_string()
            })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_exit_code_is_reported() {
        let err = ToolCommand::new("sh").args(["-c", "exit 3"]).execute().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<InstallerError>(),
            Some(&InstallerError::ToolFailed {
                tool: "sh".to_string(),
                code: 3
            })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_successful_run() {
        ToolCommand::new("sh")
            .args(["-c", "echo hello"])
            .with_context("test")
            .execute()
            .await
            .unwrap();
    }
}
