//! One-shot snapshot of the process environment.
//!
//! The installer reads its environment exactly once, at startup, into a
//! [`PlatformConfig`] which is then passed by reference to every step that
//! needs it. Nothing downstream calls `std::env` directly.

use crate::constants::{CONFIG_ENV_VAR, NO_PROGRESS_ENV_VAR};
use crate::core::InstallerError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment values consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Operating system identifier as reported by `std::env::consts::OS`.
    pub os: String,
    /// The user's home directory.
    pub home: PathBuf,
    /// Current value of `PATH` (`Path` on Windows), if any.
    pub path_var: Option<String>,
    /// Config file named by `DENO_INSTALL_CONFIG`.
    pub config_override: Option<PathBuf>,
    /// Whether `DENO_INSTALL_NO_PROGRESS` was set.
    pub no_progress: bool,
}

impl PlatformConfig {
    /// Capture the current process environment.
    ///
    /// On Windows the home directory is `HOMEDRIVE` + `HOMEPATH` when both are
    /// set, falling back to the profile directory otherwise.
    pub fn from_env() -> Result<Self, InstallerError> {
        let os = std::env::consts::OS.to_string();
        let home = Self::detect_home().ok_or(InstallerError::HomeNotFound)?;
        let path_var = std::env::var("PATH").ok().or_else(|| std::env::var("Path").ok());
        let config_override = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let no_progress = std::env::var_os(NO_PROGRESS_ENV_VAR).is_some();

        debug!("Environment snapshot: os={os}, home={}", home.display());

        Ok(Self {
            os,
            home,
            path_var,
            config_override,
            no_progress,
        })
    }

    /// Build a snapshot by hand, for callers that do not want the real environment.
    pub fn new(os: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            os: os.into(),
            home: home.into(),
            path_var: None,
            config_override: None,
            no_progress: false,
        }
    }

    #[must_use]
    pub fn with_path_var(mut self, path_var: impl Into<String>) -> Self {
        self.path_var = Some(path_var.into());
        self
    }

    #[must_use]
    pub fn with_config_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_override = Some(path.into());
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn detect_home() -> Option<PathBuf> {
        if cfg!(windows) {
            let drive = std::env::var_os("HOMEDRIVE");
            let path = std::env::var_os("HOMEPATH");
            if let (Some(drive), Some(path)) = (drive, path) {
                let mut home = PathBuf::from(drive);
                home.push(path);
                return Some(home);
            }
        }
        dirs::home_dir()
    }
}
