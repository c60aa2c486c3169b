//! Constants shared across the installer.
//!
//! Release locations, asset names, and the numeric bounds that keep the
//! network and verification loops finite. Most of these are only defaults;
//! [`InstallerConfig`](crate::config::InstallerConfig) can override the
//! locations and limits at runtime.

/// Release listing root for the deno repository.
///
/// `<root>/latest` redirects to the newest release page and
/// `<root>/tag/<tag>` is the page for a specific release.
pub const DENO_RELEASES_URL: &str = "https://github.com/denoland/deno/releases";

/// Origin prefixed to the scraped asset href to build the download URL.
pub const GITHUB_ORIGIN: &str = "https://github.com";

/// Every genuine asset href on a release page starts with this path.
pub const ASSET_PATH_PREFIX: &str = "/denoland";

/// Directory that receives the `deno` symlink on Linux and macOS.
pub const POSIX_LINK_DIR: &str = "/usr/local/bin";

/// Upper bound on GET requests issued while following one URL.
///
/// Three redirects plus the final response fit; a fifth request is never sent.
pub const MAX_REQUESTS: u32 = 4;

/// Timeout applied to each HTTP request (5 minutes).
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Linux release asset (single gzip-compressed executable).
pub const LINUX_ASSET: &str = "deno_linux_x64.gz";

/// macOS release asset (single gzip-compressed executable).
pub const MACOS_ASSET: &str = "deno_osx_x64.gz";

/// Windows release asset (zip container holding `deno.exe`).
pub const WINDOWS_ASSET: &str = "deno_win_x64.zip";

/// Install root created under the user's home directory.
pub const INSTALL_DIR_NAME: &str = ".deno";

/// Binary directory inside the install root.
pub const BIN_DIR_NAME: &str = "bin";

/// Prefix given to the previous binary when it is moved aside.
pub const BACKUP_PREFIX: &str = "old_";

/// Optional config file looked up inside the install root.
pub const CONFIG_FILE_NAME: &str = "install.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DENO_INSTALL_CONFIG";

/// Environment variable that disables spinners when set.
pub const NO_PROGRESS_ENV_VAR: &str = "DENO_INSTALL_NO_PROGRESS";

/// Prefix for progress lines written to stdout.
pub const INFO_PREFIX: &str = "[deno-install info]";

/// Prefix for diagnostics written to stderr.
pub const ERROR_PREFIX: &str = "[deno-install error]";

/// Flag passed to the installed binary to make it report its version.
pub const VERSION_FLAG: &str = "--version";

/// Minimum number of bytes read from `deno --version` before matching.
pub const VERSION_PROBE_MIN_BYTES: usize = 16;

/// Size of the buffer that receives the version output.
pub const VERSION_PROBE_BUFFER_SIZE: usize = 32;

/// Maximum number of reads attempted on the version output.
pub const VERSION_PROBE_MAX_POLLS: u32 = 50;

/// Delay granted to each read attempt (100ms).
pub const VERSION_PROBE_INTERVAL_MS: u64 = 100;

/// Attempts made when moving the backup binary back into place.
///
/// Windows may briefly hold a lock on a freshly written executable.
pub const RESTORE_ATTEMPTS: usize = 3;

/// Delay between restore attempts (1 second).
pub const RESTORE_RETRY_DELAY_MS: u64 = 1000;
