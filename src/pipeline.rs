//! End-to-end install run.
//!
//! ```text
//! resolve release -> download archive -> stash old binary -> unpack
//!   -> chmod -> integrate -> verify -> remove workspace
//! ```
//!
//! Steps run strictly one after another. Once the previous binary has been
//! stashed, any failure in the remaining steps puts it back before the error
//! is returned, so an interrupted update leaves the old version working. A
//! failed fresh install removes the binary and any symlink it created.

use crate::backup::BackupManager;
use crate::config::{InstallerConfig, PlatformConfig};
use crate::download::ArchiveFetcher;
use crate::http::HttpClient;
use crate::installer::{Installer, Integration};
use crate::paths::InstallPaths;
use crate::platform::{Platform, PlatformProfile};
use crate::release::{ReleaseLocator, ReleaseReference, ReleaseTag};
use crate::utils::progress::Reporter;
use crate::verify::Verifier;
use anyhow::{Context, Result};
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, error, warn};

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub reference: ReleaseReference,
    /// Reinstall even when the requested version is already in place.
    pub force: bool,
    /// Create the symlink / `PATH` entry.
    pub link: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            reference: ReleaseReference::latest(),
            force: false,
            link: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        tag: ReleaseTag,
        integration: Integration,
        replaced_previous: bool,
    },
    AlreadyCurrent {
        tag: ReleaseTag,
    },
}

/// Scratch directory for the downloaded archive. Removed on drop.
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("deno-install-")
            .tempdir()
            .context("Failed to create temporary directory")?;
        debug!("Workspace at {}", dir.path().display());
        Ok(Self {
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, logging instead of failing.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove {}: {e}", path.display());
        }
    }
}

pub struct Pipeline<'a, C> {
    client: &'a C,
    config: &'a InstallerConfig,
    env: &'a PlatformConfig,
    reporter: Reporter,
    platform: Platform,
    profile: PlatformProfile,
    paths: InstallPaths,
}

impl<'a, C: HttpClient> Pipeline<'a, C> {
    pub fn new(
        client: &'a C,
        config: &'a InstallerConfig,
        env: &'a PlatformConfig,
        reporter: Reporter,
    ) -> Result<Self> {
        let platform = Platform::detect(&env.os)?;
        let profile = platform.profile();
        let paths = InstallPaths::new(env.home(), &profile, &config.link_dir);

        Ok(Self {
            client,
            config,
            env,
            reporter,
            platform,
            profile,
            paths,
        })
    }

    pub const fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    pub async fn run(&self, options: &InstallOptions) -> Result<InstallOutcome> {
        self.reporter.info(format!("Installing deno ({})", options.reference));

        let spinner = self.reporter.spinner(format!("Resolving {}", options.reference));
        let locator = ReleaseLocator::new(self.client, self.config, self.profile.asset_filename);
        let release = locator.resolve(&options.reference).await;
        spinner.finish();
        let release = release?;
        self.reporter.info(format!("Resolved {} at {}", release.tag, release.url));

        let verifier = Verifier::new(&self.config.verify);
        if !options.force && verifier.is_current(&self.paths.binary_path, &release.tag).await {
            self.reporter.info(format!("deno {} is already installed", release.tag));
            return Ok(InstallOutcome::AlreadyCurrent {
                tag: release.tag,
            });
        }

        let workspace = TempWorkspace::create()?;

        let spinner = self.reporter.spinner(format!("Downloading {}", self.profile.asset_filename));
        let archive = ArchiveFetcher::new(self.client, self.config)
            .download(workspace.path(), &release.url, self.profile.archive_suffix)
            .await;
        spinner.finish();
        let archive = archive?;

        let installer = Installer::new(self.platform, &self.paths, options.link);
        installer.ensure_bin_dir().await?;

        let mut backup = BackupManager::for_install(&self.paths);
        let replaced_previous = backup.stash().await?;

        let mut integrated = None;
        let result = async {
            self.platform.unpack(&archive, &self.paths).await?;
            installer.set_permissions().await?;
            let integration = installer.integrate(self.env).await?;
            integrated = Some(integration.clone());

            let spinner = self.reporter.spinner("Verifying installation");
            let checked = verifier.check(&self.paths.binary_path, &release.tag).await;
            spinner.finish();
            checked?;

            Ok::<_, anyhow::Error>(integration)
        }
        .await;

        let integration = match result {
            Ok(integration) => integration,
            Err(e) => {
                if backup.is_stashed() {
                    if let Err(restore_err) = backup.restore().await {
                        error!("Failed to restore previous binary: {restore_err:#}");
                    } else {
                        self.reporter.info("Restored previous deno binary");
                    }
                } else {
                    installer.discard(integrated.as_ref()).await;
                }
                workspace.close();
                return Err(e);
            }
        };

        workspace.close();

        Ok(InstallOutcome::Installed {
            tag: release.tag,
            integration,
            replaced_previous,
        })
    }
}
