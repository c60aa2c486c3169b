//! Platform selection and platform-specific steps
//!
//! The installer supports two platform families that differ in archive
//! format, extraction tool and how the binary is made reachable from a shell:
//!
//! | | POSIX (Linux, macOS) | Windows |
//! |---|---|---|
//! | Asset | `deno_{linux,osx}_x64.gz` | `deno_win_x64.zip` |
//! | Unpack | `gunzip` in place, copy into `~/.deno/bin` | `Expand-Archive` into `~/.deno/bin` |
//! | Integrate | symlink in `/usr/local/bin` | append `~/.deno/bin` to user `PATH` |
//!
//! [`Platform`] is chosen once from the OS name and every platform-dependent
//! step dispatches on it with an exhaustive `match`.

mod posix;
mod windows;

use crate::config::PlatformConfig;
use crate::constants::{LINUX_ASSET, MACOS_ASSET, WINDOWS_ASSET};
use crate::core::InstallerError;
use crate::installer::Integration;
use crate::paths::InstallPaths;
use anyhow::Result;
use std::path::Path;

/// Which POSIX system the installer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosixFlavor {
    Linux,
    MacOs,
}

/// Platform family selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix(PosixFlavor),
    Windows,
}

/// Immutable per-process facts derived from the [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub is_windows: bool,
    pub asset_filename: &'static str,
    pub archive_suffix: &'static str,
    pub binary_name: &'static str,
}

impl Platform {
    /// Select the platform from an OS identifier (`std::env::consts::OS` values).
    ///
    /// Any other OS is fatal: no release asset exists for it.
    pub fn detect(os: &str) -> Result<Self, InstallerError> {
        match os {
            "linux" => Ok(Self::Posix(PosixFlavor::Linux)),
            "macos" => Ok(Self::Posix(PosixFlavor::MacOs)),
            "windows" => Ok(Self::Windows),
            other => Err(InstallerError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    pub const fn profile(&self) -> PlatformProfile {
        match self {
            Self::Posix(_) => PlatformProfile {
                is_windows: false,
                asset_filename: self.asset_filename(),
                archive_suffix: "gz",
                binary_name: "deno",
            },
            Self::Windows => PlatformProfile {
                is_windows: true,
                asset_filename: self.asset_filename(),
                archive_suffix: "zip",
                binary_name: "deno.exe",
            },
        }
    }

    pub const fn asset_filename(&self) -> &'static str {
        match self {
            Self::Posix(PosixFlavor::Linux) => LINUX_ASSET,
            Self::Posix(PosixFlavor::MacOs) => MACOS_ASSET,
            Self::Windows => WINDOWS_ASSET,
        }
    }

    /// Extract the downloaded archive so that the binary lands at
    /// `paths.binary_path`.
    ///
    /// Any previous binary must already have been moved aside; the caller
    /// owns that step so it can undo it on failure.
    pub async fn unpack(&self, archive: &Path, paths: &InstallPaths) -> Result<()> {
        match self {
            Self::Posix(_) => posix::unpack_gzip(archive, paths).await,
            Self::Windows => windows::expand_zip(archive, paths).await,
        }
    }

    /// Make the installed binary reachable by name from a new shell.
    pub async fn integrate(
        &self,
        paths: &InstallPaths,
        env: &PlatformConfig,
    ) -> Result<Integration> {
        match self {
            Self::Posix(_) => posix::link_binary(paths).await,
            Self::Windows => windows::add_to_user_path(paths, env).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Platform::detect("linux").unwrap(), Platform::Posix(PosixFlavor::Linux));
        assert_eq!(Platform::detect("macos").unwrap(), Platform::Posix(PosixFlavor::MacOs));
        assert_eq!(Platform::detect("windows").unwrap(), Platform::Windows);
    }

    #[test]
    fn test_detect_unsupported() {
        let err = Platform::detect("freebsd").unwrap_err();
        assert_eq!(
            err,
            InstallerError::UnsupportedPlatform {
                os: "freebsd".to_string()
            }
        );
    }

    #[test]
    fn test_profiles() {
        let linux = Platform::Posix(PosixFlavor::Linux).profile();
        assert!(!linux.is_windows);
        assert_eq!(linux.asset_filename, "deno_linux_x64.gz");
        assert_eq!(linux.archive_suffix, "gz");
        assert_eq!(linux.binary_name, "deno");

        let mac = Platform::Posix(PosixFlavor::MacOs).profile();
        assert_eq!(mac.asset_filename, "deno_osx_x64.gz");

        let windows = Platform::Windows.profile();
        assert!(windows.is_windows);
        assert_eq!(windows.asset_filename, "deno_win_x64.zip");
        assert_eq!(windows.archive_suffix, "zip");
        assert_eq!(windows.binary_name, "deno.exe");
    }
}
