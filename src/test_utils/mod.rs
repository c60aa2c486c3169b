//! Test utilities for the installer
//!
//! Helpers shared by unit tests and the integration tests under `tests/`
//! (enabled there through the `test-utils` feature):
//!
//! - [`ScriptedClient`] - an [`HttpClient`](crate::http::HttpClient) that
//!   replays canned responses and records every requested URL
//! - [`fixtures`] - release pages, fake `deno` executables and archives
//! - [`init_test_logging`] - one-time tracing setup honoring `RUST_LOG`

pub mod fixtures;
mod scripted_client;

pub use scripted_client::ScriptedClient;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests stay
/// silent.
///
/// ```bash
/// RUST_LOG=deno_installer=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
