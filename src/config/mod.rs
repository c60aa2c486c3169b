//! Configuration for an installer run
//!
//! Two inputs are resolved once at startup and then passed down by reference:
//!
//! - [`PlatformConfig`] - a snapshot of the process environment (OS, home
//!   directory, `PATH`, config override)
//! - [`InstallerConfig`] - release locations, link directory and loop bounds,
//!   read from an optional TOML file
//!
//! Neither is mutated after construction.

mod environment;
mod installer;

pub use environment::PlatformConfig;
pub use installer::{InstallerConfig, VerifyConfig};
