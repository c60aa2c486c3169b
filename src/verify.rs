//! Post-install check: run the new binary and compare its reported version.
//!
//! Only a short prefix of the output is kept. The first line of
//! `deno --version` (`deno 1.2.3`) fits comfortably in the buffer, and
//! filling it stops as soon as enough bytes arrived, at EOF, or after the
//! configured number of polls. Anything after that is drained and dropped
//! while waiting for the child to exit.

use crate::config::VerifyConfig;
use crate::constants::VERSION_FLAG;
use crate::core::InstallerError;
use crate::release::ReleaseTag;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Pattern that matches `tag` (without its leading `v`) in version output.
///
/// The digits must not be glued to further digits, so `1.2.3` does not
/// accept `11.2.3` or `1.2.34`.
pub fn version_pattern(tag: &ReleaseTag) -> Regex {
    let bare = tag.to_string();
    let bare = bare.trim_start_matches('v');
    Regex::new(&format!(r"(?:^|[^0-9]){}(?:[^0-9]|$)", regex::escape(bare)))
        .expect("escaped version is a valid pattern")
}

pub fn reports_version(output: &str, tag: &ReleaseTag) -> bool {
    version_pattern(tag).is_match(output)
}

pub struct Verifier<'a> {
    config: &'a VerifyConfig,
}

impl<'a> Verifier<'a> {
    pub const fn new(config: &'a VerifyConfig) -> Self {
        Self {
            config,
        }
    }

    /// Run `binary --version` and return whatever prefix of stdout was read.
    pub async fn probe(&self, binary: &Path) -> Result<String> {
        debug!("Running {} {VERSION_FLAG}", binary.display());

        let mut child = Command::new(binary)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InstallerError::TestRunFailed {
                reason: format!("could not start {}: {e}", binary.display()),
            })?;

        let mut stdout = child.stdout.take().context("Child stdout was not captured")?;
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut filled = 0;
        let mut polls = 0;

        while filled < self.config.min_bytes && filled < buffer.len() && polls < self.config.max_polls
        {
            polls += 1;
            match timeout(self.config.poll_interval(), stdout.read(&mut buffer[filled..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => {
                    return Err(InstallerError::TestRunFailed {
                        reason: format!("reading output: {e}"),
                    }
                    .into());
                }
                Err(_) => {}
            }
        }
        debug!("Read {filled} bytes of version output in {polls} polls");

        // The rest of the output is discarded, but the pipe stays open until
        // the child exits so late writes do not hit a closed pipe
        let wait_budget = self.config.poll_interval() * self.config.max_polls.max(1);
        let finished = timeout(wait_budget, async {
            tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await?;
            child.wait().await
        })
        .await;

        let status = match finished {
            Ok(status) => status.context("Failed to wait for version check")?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(InstallerError::TestRunFailed {
                    reason: format!("{} did not exit", binary.display()),
                }
                .into());
            }
        };

        if !status.success() {
            return Err(InstallerError::TestRunFailed {
                reason: match status.code() {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                },
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&buffer[..filled]).into_owned())
    }

    /// Fail unless `binary` reports `tag`.
    pub async fn check(&self, binary: &Path, tag: &ReleaseTag) -> Result<()> {
        let output = self.probe(binary).await?;
        if reports_version(&output, tag) {
            debug!("Version check passed: {}", output.trim());
            Ok(())
        } else {
            Err(InstallerError::VersionMismatch {
                expected: tag.to_string(),
                reported: output.trim().to_string(),
            }
            .into())
        }
    }

    /// Whether `binary` exists and already reports `tag`. Any failure counts as no.
    pub async fn is_current(&self, binary: &Path, tag: &ReleaseTag) -> bool {
        binary.exists() && self.check(binary, tag).await.is_ok()
    }
}
