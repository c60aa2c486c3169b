//! Filesystem layout of an installation.
//!
//! ```text
//! <home>/.deno/                 install root
//! <home>/.deno/bin/deno         live binary (deno.exe on Windows)
//! <home>/.deno/bin/old_deno     previous binary, kept after an update
//! /usr/local/bin/deno           symlink to the live binary (POSIX only)
//! ```

use crate::constants::{BACKUP_PREFIX, BIN_DIR_NAME, INSTALL_DIR_NAME};
use crate::platform::PlatformProfile;
use std::path::{Path, PathBuf};

/// Every path the installer touches, derived once from the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub install_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub binary_path: PathBuf,
    /// Where the previous binary is moved; only populated once one existed.
    pub backup_binary_path: PathBuf,
    /// Symlink location on POSIX, the `PATH` entry on Windows.
    pub integration_target: PathBuf,
}

impl InstallPaths {
    pub fn new(home: &Path, profile: &PlatformProfile, link_dir: &Path) -> Self {
        let install_dir = home.join(INSTALL_DIR_NAME);
        let bin_dir = install_dir.join(BIN_DIR_NAME);
        let binary_path = bin_dir.join(profile.binary_name);
        let backup_binary_path = bin_dir.join(format!("{BACKUP_PREFIX}{}", profile.binary_name));
        let integration_target = if profile.is_windows {
            bin_dir.clone()
        } else {
            link_dir.join(profile.binary_name)
        };

        Self {
            install_dir,
            bin_dir,
            binary_path,
            backup_binary_path,
            integration_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, PosixFlavor};

    #[test]
    fn test_posix_layout() {
        let profile = Platform::Posix(PosixFlavor::Linux).profile();
        let paths = InstallPaths::new(Path::new("/home/ada"), &profile, Path::new("/usr/local/bin"));

        assert_eq!(paths.install_dir, PathBuf::from("/home/ada/.deno"));
        assert_eq!(paths.bin_dir, PathBuf::from("/home/ada/.deno/bin"));
        assert_eq!(paths.binary_path, PathBuf::from("/home/ada/.deno/bin/deno"));
        assert_eq!(paths.backup_binary_path, PathBuf::from("/home/ada/.deno/bin/old_deno"));
        assert_eq!(paths.integration_target, PathBuf::from("/usr/local/bin/deno"));
    }

    #[test]
    fn test_windows_layout() {
        let profile = Platform::Windows.profile();
        let home = Path::new("home");
        let paths = InstallPaths::new(home, &profile, Path::new("ignored"));

        assert_eq!(paths.binary_path, home.join(".deno").join("bin").join("deno.exe"));
        assert_eq!(paths.backup_binary_path, home.join(".deno").join("bin").join("old_deno.exe"));
        assert_eq!(paths.integration_target, paths.bin_dir);
    }
}
