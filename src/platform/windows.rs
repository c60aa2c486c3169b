//! Windows steps: zip expansion and the persistent user `PATH` entry.
//!
//! Both go through PowerShell, which ships with every supported Windows
//! release. The `PATH` edit targets the user scope so it survives new
//! sessions; the running process keeps its old environment.

use crate::config::PlatformConfig;
use crate::core::InstallerError;
use crate::installer::Integration;
use crate::paths::InstallPaths;
use crate::utils::process::ToolCommand;
use anyhow::{Result, bail};
use std::path::Path;
use tracing::debug;

const POWERSHELL: &str = "powershell";

/// Quote a value as a single-quoted PowerShell string literal.
fn ps_literal(value: &Path) -> String {
    format!("'{}'", value.display().to_string().replace('\'', "''"))
}

/// Expand the release zip straight into the binary directory.
pub(super) async fn expand_zip(archive: &Path, paths: &InstallPaths) -> Result<()> {
    let script = format!(
        "Expand-Archive -Force -LiteralPath {} -DestinationPath {}",
        ps_literal(archive),
        ps_literal(&paths.bin_dir)
    );

    ToolCommand::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-Command"])
        .arg(script)
        .with_context("unpack")
        .execute()
        .await?;

    if !paths.binary_path.exists() {
        bail!(
            "Archive {} did not contain {}",
            archive.display(),
            paths.binary_path.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    Ok(())
}

/// Whether a `;`-separated `PATH` value already lists `dir`.
///
/// Comparison is case-insensitive and ignores trailing separators, matching
/// how Windows resolves `PATH` entries.
fn path_contains(path_var: &str, dir: &Path) -> bool {
    let normalize = |entry: &str| entry.trim().trim_end_matches(['\\', '/']).to_lowercase();
    let wanted = normalize(&dir.display().to_string());
    path_var.split(';').any(|entry| !entry.trim().is_empty() && normalize(entry) == wanted)
}

/// Append the binary directory to the persisted user `PATH` unless the
/// current `PATH` already references it.
pub(super) async fn add_to_user_path(
    paths: &InstallPaths,
    env: &PlatformConfig,
) -> Result<Integration> {
    let dir = &paths.integration_target;

    if env.path_var.as_deref().is_some_and(|path_var| path_contains(path_var, dir)) {
        debug!("{} is already on PATH", dir.display());
        return Ok(Integration::PathAlreadyPresent(dir.clone()));
    }

    // Reads the user-scoped value so machine entries are not copied into it
    let script = format!(
        "$dir = {dir}; \
         $current = [Environment]::GetEnvironmentVariable('Path', 'User'); \
         if (-not $current) {{ $updated = $dir }} \
         elseif (($current -split ';') -contains $dir) {{ exit 0 }} \
         else {{ $updated = \"$current;$dir\" }}; \
         [Environment]::SetEnvironmentVariable('Path', $updated, 'User')",
        dir = ps_literal(dir)
    );

    let result = ToolCommand::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-Command"])
        .arg(script)
        .with_context("PATH update")
        .execute()
        .await;

    if let Err(err) = result {
        return match err.downcast_ref::<InstallerError>() {
            Some(InstallerError::ToolFailed { .. }) => Err(InstallerError::IntegrationFailed {
                operation: "adding to user PATH".to_string(),
                path: dir.display().to_string(),
                reason: err.to_string(),
            }
            .into()),
            _ => Err(err),
        };
    }

    Ok(Integration::PathUpdated(dir.clone()))
}
