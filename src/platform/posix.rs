//! Linux and macOS steps: gunzip extraction and the `/usr/local/bin` symlink.

use crate::core::InstallerError;
use crate::installer::Integration;
use crate::paths::InstallPaths;
use crate::utils::process::ToolCommand;
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Decompress `<archive>.gz` in place with `gunzip`, then copy the result to
/// the live binary path.
pub(super) async fn unpack_gzip(archive: &Path, paths: &InstallPaths) -> Result<()> {
    ToolCommand::new("gunzip")
        .arg("-d")
        .arg(archive.as_os_str())
        .with_context("unpack")
        .execute()
        .await?;

    // gunzip strips the .gz suffix
    let unpacked = archive.with_extension("");
    debug!("Copying {} to {}", unpacked.display(), paths.binary_path.display());
    fs::copy(&unpacked, &paths.binary_path).await.with_context(|| {
        format!(
            "Failed to copy {} to {}",
            unpacked.display(),
            paths.binary_path.display()
        )
    })?;

    Ok(())
}

/// Result of probing the symlink location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkProbe {
    Occupied,
    Vacant,
}

async fn probe(link: &Path) -> io::Result<LinkProbe> {
    match fs::symlink_metadata(link).await {
        Ok(_) => Ok(LinkProbe::Occupied),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LinkProbe::Vacant),
        Err(e) => Err(e),
    }
}

/// Create `integration_target -> binary_path` unless something already sits
/// at the link location.
///
/// An existing entry is never replaced, even if it points elsewhere.
pub(super) async fn link_binary(paths: &InstallPaths) -> Result<Integration> {
    let link = &paths.integration_target;

    let state = probe(link).await.map_err(|e| InstallerError::IntegrationFailed {
        operation: "probing".to_string(),
        path: link.display().to_string(),
        reason: e.to_string(),
    })?;

    match state {
        LinkProbe::Occupied => {
            match fs::read_link(link).await {
                Ok(target) if target == paths.binary_path => {
                    debug!("{} already links to {}", link.display(), target.display());
                }
                Ok(target) => warn!(
                    "{} points to {}, leaving it in place",
                    link.display(),
                    target.display()
                ),
                Err(_) => warn!("{} exists and is not a symlink, leaving it in place", link.display()),
            }
            Ok(Integration::AlreadyLinked(link.clone()))
        }
        LinkProbe::Vacant => {
            create_symlink(&paths.binary_path, link).await.map_err(|e| {
                InstallerError::IntegrationFailed {
                    operation: "linking".to_string(),
                    path: link.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            debug!("Linked {} -> {}", link.display(), paths.binary_path.display());
            Ok(Integration::Linked(link.clone()))
        }
    }
}

#[cfg(unix)]
async fn create_symlink(original: &Path, link: &Path) -> io::Result<()> {
    fs::symlink(original, link).await
}

#[cfg(windows)]
async fn create_symlink(original: &Path, link: &Path) -> io::Result<()> {
    fs::symlink_file(original, link).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::platform::{Platform, PosixFlavor};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn layout(temp: &TempDir) -> InstallPaths {
        let profile = Platform::Posix(PosixFlavor::Linux).profile();
        let link_dir = temp.path().join("usr-local-bin");
        std::fs::create_dir_all(&link_dir).unwrap();
        let paths = InstallPaths::new(&temp.path().join("home"), &profile, &link_dir);
        std::fs::create_dir_all(&paths.bin_dir).unwrap();
        std::fs::write(&paths.binary_path, b"#!/bin/sh\n").unwrap();
        paths
    }

    #[tokio::test]
    async fn test_link_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = layout(&temp);

        let first = link_binary(&paths).await.unwrap();
        assert_eq!(first, Integration::Linked(paths.integration_target.clone()));

        let second = link_binary(&paths).await.unwrap();
        assert_eq!(second, Integration::AlreadyLinked(paths.integration_target.clone()));

        let entries: Vec<PathBuf> = std::fs::read_dir(paths.integration_target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries, vec![paths.integration_target.clone()]);
        assert_eq!(std::fs::read_link(&paths.integration_target).unwrap(), paths.binary_path);
    }

    #[tokio::test]
    async fn test_existing_entry_left_alone() {
        let temp = TempDir::new().unwrap();
        let paths = layout(&temp);
        std::fs::write(&paths.integration_target, b"someone else's deno").unwrap();

        let outcome = link_binary(&paths).await.unwrap();
        assert_eq!(outcome, Integration::AlreadyLinked(paths.integration_target.clone()));
        assert_eq!(std::fs::read(&paths.integration_target).unwrap(), b"someone else's deno");
    }

    #[tokio::test]
    async fn test_missing_link_dir_is_integration_error() {
        let temp = TempDir::new().unwrap();
        let mut paths = layout(&temp);
        paths.integration_target = temp.path().join("no-such-dir").join("deno");

        let err = link_binary(&paths).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstallerError>(),
            Some(InstallerError::IntegrationFailed { operation, .. }) if operation == "linking"
        ));
    }

    #[tokio::test]
    async fn test_probe_failure_is_not_treated_as_missing() {
        let temp = TempDir::new().unwrap();
        let mut paths = layout(&temp);
        // A regular file used as a directory component yields ENOTDIR, not ENOENT
        paths.integration_target = paths.binary_path.join("deno");

        let err = link_binary(&paths).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstallerError>(),
            Some(InstallerError::IntegrationFailed { operation, .. }) if operation == "probing"
        ));
    }
}
