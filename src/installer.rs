//! Placing the unpacked binary: directories, permissions and shell reachability.

use crate::config::PlatformConfig;
use crate::paths::InstallPaths;
use crate::platform::Platform;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// How the binary was made reachable from a new shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integration {
    /// A new symlink was created at this path.
    Linked(PathBuf),
    /// Something already existed at the symlink path and was left in place.
    AlreadyLinked(PathBuf),
    /// This directory was appended to the user `PATH`.
    PathUpdated(PathBuf),
    /// This directory was already on `PATH`.
    PathAlreadyPresent(PathBuf),
    /// Integration was turned off for this run.
    Skipped,
}

impl Integration {
    /// One-line description for the final report, if there is anything to say.
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Linked(link) => Some(format!("Linked {}", link.display())),
            Self::AlreadyLinked(_) => None,
            Self::PathUpdated(dir) => {
                Some(format!("Added {} to PATH; restart your shell to use it", dir.display()))
            }
            Self::PathAlreadyPresent(_) | Self::Skipped => None,
        }
    }
}

pub struct Installer<'a> {
    platform: Platform,
    paths: &'a InstallPaths,
    link: bool,
}

impl<'a> Installer<'a> {
    pub const fn new(platform: Platform, paths: &'a InstallPaths, link: bool) -> Self {
        Self {
            platform,
            paths,
            link,
        }
    }

    /// Create `~/.deno/bin` and any missing parents.
    pub async fn ensure_bin_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.paths.bin_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.paths.bin_dir.display()))
    }

    /// Mode `0744` on the install root and the binary. No-op on Windows.
    pub async fn set_permissions(&self) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            for path in [&self.paths.install_dir, &self.paths.binary_path] {
                debug!("chmod 744 {}", path.display());
                fs::set_permissions(path, std::fs::Permissions::from_mode(0o744))
                    .await
                    .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Remove what a failed fresh install left behind: the binary and a
    /// symlink this run created. Best effort; failures are only logged.
    pub async fn discard(&self, integration: Option<&Integration>) {
        if let Some(Integration::Linked(link)) = integration {
            if let Err(e) = fs::remove_file(link).await {
                warn!("Failed to remove {}: {e}", link.display());
            }
        }
        match fs::remove_file(&self.paths.binary_path).await {
            Ok(()) => debug!("Removed unverified {}", self.paths.binary_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {e}", self.paths.binary_path.display()),
        }
    }

    pub async fn integrate(&self, env: &PlatformConfig) -> Result<Integration> {
        if !self.link {
            debug!("Shell integration disabled");
            return Ok(Integration::Skipped);
        }
        self.platform.integrate(self.paths, env).await
    }
}
