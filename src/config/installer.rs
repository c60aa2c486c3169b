//! Installer configuration file (`~/.deno/install.toml`).
//!
//! Every field is optional; an absent file means all defaults. The file lets
//! mirrors and tests point the installer somewhere other than GitHub and
//! `/usr/local/bin`, and tune the network and verification bounds.
//!
//! ```toml
//! release_root = "https://github.com/denoland/deno/releases"
//! download_origin = "https://github.com"
//! asset_path_prefix = "/denoland"
//! link_dir = "/usr/local/bin"
//! max_requests = 4
//! request_timeout_secs = 300
//!
//! [verify]
//! min_bytes = 16
//! buffer_size = 32
//! max_polls = 50
//! poll_interval_ms = 100
//! ```

use super::PlatformConfig;
use crate::constants::{
    ASSET_PATH_PREFIX, CONFIG_FILE_NAME, DENO_RELEASES_URL, GITHUB_ORIGIN,
    INSTALL_DIR_NAME, MAX_REQUESTS, POSIX_LINK_DIR, REQUEST_TIMEOUT_SECS,
    VERSION_PROBE_BUFFER_SIZE, VERSION_PROBE_INTERVAL_MS, VERSION_PROBE_MAX_POLLS,
    VERSION_PROBE_MIN_BYTES,
};
use crate::core::InstallerError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

fn default_release_root() -> String {
    DENO_RELEASES_URL.to_string()
}

fn default_download_origin() -> String {
    GITHUB_ORIGIN.to_string()
}

fn default_asset_path_prefix() -> String {
    ASSET_PATH_PREFIX.to_string()
}

fn default_link_dir() -> PathBuf {
    PathBuf::from(POSIX_LINK_DIR)
}

const fn default_max_requests() -> u32 {
    MAX_REQUESTS
}

const fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

/// Where releases come from and how hard the installer tries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Release listing root; `latest` and `tag/<tag>` are appended to it.
    #[serde(default = "default_release_root")]
    pub release_root: String,

    /// Origin prepended to scraped asset hrefs.
    #[serde(default = "default_download_origin")]
    pub download_origin: String,

    /// Path prefix every accepted asset href must start with.
    #[serde(default = "default_asset_path_prefix")]
    pub asset_path_prefix: String,

    /// Directory receiving the `deno` symlink on POSIX platforms.
    #[serde(default = "default_link_dir")]
    pub link_dir: PathBuf,

    /// Maximum GET requests per URL, redirects included.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub verify: VerifyConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            release_root: default_release_root(),
            download_origin: default_download_origin(),
            asset_path_prefix: default_asset_path_prefix(),
            link_dir: default_link_dir(),
            max_requests: default_max_requests(),
            request_timeout_secs: default_request_timeout_secs(),
            verify: VerifyConfig::default(),
        }
    }
}

const fn default_min_bytes() -> usize {
    VERSION_PROBE_MIN_BYTES
}

const fn default_buffer_size() -> usize {
    VERSION_PROBE_BUFFER_SIZE
}

const fn default_max_polls() -> u32 {
    VERSION_PROBE_MAX_POLLS
}

const fn default_poll_interval_ms() -> u64 {
    VERSION_PROBE_INTERVAL_MS
}

/// Bounds on reading `deno --version` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_min_bytes")]
    pub min_bytes: usize,

    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            min_bytes: default_min_bytes(),
            buffer_size: default_buffer_size(),
            max_polls: default_max_polls(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl VerifyConfig {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl InstallerConfig {
    /// Locate and load the config for this run.
    ///
    /// Lookup order: `explicit` (from `--config`), then `DENO_INSTALL_CONFIG`,
    /// then `~/.deno/install.toml`. The first two must exist; the last one is
    /// only read when present.
    pub async fn resolve(explicit: Option<&Path>, env: &PlatformConfig) -> Result<Self> {
        if let Some(path) = explicit.or(env.config_override.as_deref()) {
            return Self::load_from(path).await;
        }

        let default_path = Self::default_path(env);
        if default_path.exists() {
            Self::load_from(&default_path).await
        } else {
            debug!("No config at {}, using defaults", default_path.display());
            Ok(Self::default())
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read installer config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| InstallerError::ConfigError {
            message: format!("{}: {}", path.display(), e.message()),
        })?;
        config.validate()?;

        debug!("Loaded installer config from {}", path.display());
        Ok(config)
    }

    pub fn default_path(env: &PlatformConfig) -> PathBuf {
        env.home.join(INSTALL_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), InstallerError> {
        if self.max_requests == 0 {
            return Err(InstallerError::ConfigError {
                message: "max_requests must be at least 1".to_string(),
            });
        }
        if self.verify.buffer_size < self.verify.min_bytes {
            return Err(InstallerError::ConfigError {
                message: format!(
                    "verify.buffer_size ({}) is smaller than verify.min_bytes ({})",
                    self.verify.buffer_size, self.verify.min_bytes
                ),
            });
        }
        Ok(())
    }
}
