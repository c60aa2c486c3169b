//! Archive download into the run's temporary workspace.

use crate::config::InstallerConfig;
use crate::core::InstallerError;
use crate::http::{HttpClient, follow};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Fetches a release archive and stores it on disk.
pub struct ArchiveFetcher<'a, C> {
    client: &'a C,
    config: &'a InstallerConfig,
}

impl<'a, C: HttpClient> ArchiveFetcher<'a, C> {
    pub const fn new(client: &'a C, config: &'a InstallerConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    /// Download `url` into `dir` as `<timestamp>.<suffix>` and return the path.
    ///
    /// Bytes go to a `.part` sibling first; the final name only appears once
    /// the whole body has been written and synced.
    pub async fn download(&self, dir: &Path, url: &str, suffix: &str) -> Result<PathBuf> {
        let response = follow(self.client, url, self.config.max_requests).await?;
        let target = archive_path(dir, suffix);
        let partial = target.with_extension(format!("{suffix}.part"));

        debug!("Writing {} bytes to {}", response.body.len(), target.display());

        if let Err(e) = write_fully(&partial, &response.body).await {
            let _ = fs::remove_file(&partial).await;
            return Err(InstallerError::TransferFailed {
                path: target.display().to_string(),
                reason: e.to_string(),
            }
            .into());
        }

        fs::rename(&partial, &target).await.map_err(|e| InstallerError::TransferFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(target)
    }
}

async fn write_fully(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Timestamp-named archive path inside `dir` that does not exist yet.
fn archive_path(dir: &Path, suffix: &str) -> PathBuf {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let candidate = dir.join(format!("{stamp}.{suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        stamp += 1;
    }
}
