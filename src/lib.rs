//! deno-installer - install and update the prebuilt deno executable
//!
//! Resolves a deno release (latest, or a `vMAJOR.MINOR.PATCH` tag) to the
//! asset for the current platform, downloads and unpacks it into
//! `~/.deno/bin`, makes it reachable from new shells and checks that the new
//! binary reports the expected version.
//!
//! # Pipeline
//!
//! ```text
//! cli -> pipeline
//!          |- release   scrape the release page for the asset href
//!          |- download  fetch the archive into a temp workspace
//!          |- backup    move the previous binary to old_<name>
//!          |- platform  gunzip / Expand-Archive, symlink / PATH
//!          |- installer bin dir, permissions, integration
//!          '- verify    run `<binary> --version` and match the tag
//! ```
//!
//! All HTTP goes through [`http::follow`], which caps the number of requests
//! per URL and walks redirects itself. On any failure after the previous
//! binary was moved aside, the pipeline moves it back.
//!
//! # Modules
//!
//! - [`cli`] - argument parsing and the top-level command
//! - [`config`] - environment snapshot and the optional `install.toml`
//! - [`core`] - error taxonomy and user-facing error rendering
//! - [`constants`] - release locations, asset names and numeric bounds
//! - [`http`] - bounded redirect following over a pluggable client
//! - [`release`] - release tags and asset discovery
//! - [`download`] - archive download
//! - [`backup`] - stash and restore of the previous binary
//! - [`platform`] - platform selection and platform-specific steps
//! - [`paths`] - installation layout
//! - [`installer`] - directory, permission and shell integration steps
//! - [`verify`] - post-install version check
//! - [`pipeline`] - the end-to-end run
//! - [`utils`] - process execution and progress output

pub mod backup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod download;
pub mod http;
pub mod installer;
pub mod paths;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod utils;
pub mod verify;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
