//! Command-line interface for `deno-install`.
//!
//! ```bash
//! deno-install              # latest release
//! deno-install v1.4.0       # a specific release
//! deno-install --force -v   # reinstall with debug logging
//! ```
//!
//! Parsing is done with clap's derive API. The version argument is taken as a
//! plain string and validated in [`Cli::execute_with_config`] so a bad tag goes through
//! the same error path as every other failure (exit status 1).

use crate::config::{InstallerConfig, PlatformConfig};
use crate::http::ReqwestClient;
use crate::pipeline::{InstallOptions, InstallOutcome, Pipeline};
use crate::release::{ReleaseReference, ReleaseTag};
use crate::utils::progress::Reporter;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

/// Settings derived from global flags, independent of the install itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    pub no_progress: bool,
    pub config_path: Option<PathBuf>,
}

/// Install or update the deno executable from GitHub releases.
#[derive(Parser, Debug)]
#[command(
    name = "deno-install",
    about = "Install or update the deno executable",
    version,
    long_about = "Downloads a prebuilt deno release for this platform into ~/.deno/bin, \
                  makes it reachable from new shells and checks that it runs."
)]
pub struct Cli {
    /// Release tag to install (vMAJOR.MINOR.PATCH); latest when omitted.
    #[arg(id = "release_version", value_name = "VERSION")]
    version: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long)]
    quiet: bool,

    /// Installer config file (default: ~/.deno/install.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable spinners.
    #[arg(long)]
    no_progress: bool,

    /// Skip the /usr/local/bin symlink or PATH update.
    #[arg(long)]
    no_link: bool,

    /// Reinstall even if the requested version is already installed.
    #[arg(short, long)]
    force: bool,
}

impl Cli {
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Parse the version argument.
    pub fn reference(&self) -> Result<ReleaseReference> {
        Ok(match self.version.as_deref() {
            Some(tag) => ReleaseReference::tag(tag.parse::<ReleaseTag>()?),
            None => ReleaseReference::latest(),
        })
    }

    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        let reference = self.reference()?;
        let env = PlatformConfig::from_env()?;
        let config = InstallerConfig::resolve(cli_config.config_path.as_deref(), &env).await?;
        debug!("Using {config:?}");

        let client = ReqwestClient::new(config.request_timeout())?;
        let reporter = Reporter::new(self.quiet, !(cli_config.no_progress || env.no_progress));
        let pipeline = Pipeline::new(&client, &config, &env, reporter)?;

        let options = InstallOptions {
            reference,
            force: self.force,
            link: !self.no_link,
        };

        match pipeline.run(&options).await? {
            InstallOutcome::Installed {
                tag,
                integration,
                replaced_previous,
            } => {
                if let Some(note) = integration.describe() {
                    reporter.info(note);
                }
                if replaced_previous {
                    reporter.info(format!(
                        "Previous binary kept at {}",
                        pipeline.paths().backup_binary_path.display()
                    ));
                }
                reporter.success(format!(
                    "Installed deno {tag} to {}",
                    pipeline.paths().binary_path.display()
                ));
            }
            InstallOutcome::AlreadyCurrent {
                tag,
            } => {
                reporter.success(format!("deno {tag} is up to date"));
            }
        }
        Ok(())
    }
}
