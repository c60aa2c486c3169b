use crate::constants::{RESTORE_ATTEMPTS, RESTORE_RETRY_DELAY_MS};
use crate::paths::InstallPaths;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

/// Moves the live binary aside before an update and puts it back on failure.
///
/// The previous binary is renamed to `old_<name>` next to the live one and
/// stays there after a successful update, so a user can always go back one
/// version by hand. Only one generation is kept: stashing replaces any older
/// backup.
///
/// # Examples
///
/// ```rust,no_run
/// use deno_installer::backup::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut backup = BackupManager::new(
///     PathBuf::from("/home/ada/.deno/bin/deno"),
///     PathBuf::from("/home/ada/.deno/bin/old_deno"),
/// );
///
/// backup.stash().await?;
/// let install_failed = true;
/// if install_failed {
///     backup.restore().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BackupManager {
    live_path: PathBuf,
    backup_path: PathBuf,
    stashed: bool,
}

impl BackupManager {
    pub const fn new(live_path: PathBuf, backup_path: PathBuf) -> Self {
        Self {
            live_path,
            backup_path,
            stashed: false,
        }
    }

    pub fn for_install(paths: &InstallPaths) -> Self {
        Self::new(paths.binary_path.clone(), paths.backup_binary_path.clone())
    }

    /// Rename the live binary to the backup name.
    ///
    /// Returns `false` when there was nothing to move (fresh install).
    pub async fn stash(&mut self) -> Result<bool> {
        if !self.live_path.exists() {
            debug!("No existing binary at {}", self.live_path.display());
            return Ok(false);
        }

        if self.backup_path.exists() {
            debug!("Removing old backup at {}", self.backup_path.display());
            fs::remove_file(&self.backup_path).await.with_context(|| {
                format!("Failed to remove old backup {}", self.backup_path.display())
            })?;
        }

        info!("Moving {} to {}", self.live_path.display(), self.backup_path.display());
        fs::rename(&self.live_path, &self.backup_path).await.with_context(|| {
            format!(
                "Failed to move {} to {}",
                self.live_path.display(),
                self.backup_path.display()
            )
        })?;

        self.stashed = true;
        Ok(true)
    }

    /// Put the stashed binary back, discarding whatever now sits at the live
    /// path.
    ///
    /// Retried a few times since Windows may still hold the new executable
    /// open right after a failed verification run.
    pub async fn restore(&self) -> Result<()> {
        if !self.stashed {
            bail!("Nothing was stashed for {}", self.live_path.display());
        }
        if !self.backup_path.exists() {
            bail!("No backup found at {}", self.backup_path.display());
        }

        warn!("Restoring {} from {}", self.live_path.display(), self.backup_path.display());

        let strategy = FixedInterval::from_millis(RESTORE_RETRY_DELAY_MS)
            .take(RESTORE_ATTEMPTS.saturating_sub(1));
        Retry::spawn(strategy, || self.attempt_restore()).await?;

        info!("Restored previous binary");
        Ok(())
    }

    async fn attempt_restore(&self) -> Result<()> {
        if self.live_path.exists() {
            fs::remove_file(&self.live_path).await.with_context(|| {
                format!("Failed to remove partial binary {}", self.live_path.display())
            })?;
        }

        fs::rename(&self.backup_path, &self.live_path).await.with_context(|| {
            format!("Failed to restore backup {}", self.backup_path.display())
        })?;
        Ok(())
    }

    pub const fn is_stashed(&self) -> bool {
        self.stashed
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}
