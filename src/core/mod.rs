//! Core types shared by every installer step
//!
//! ## `error` - Error taxonomy and reporting
//!
//! - [`InstallerError`] - Closed set of failure kinds raised by the pipeline
//! - [`ErrorContext`] - User-facing wrapper with details and a suggestion
//! - [`user_friendly_error`] - Recover the typed kind from an [`anyhow::Error`]
//!
//! Every step returns [`anyhow::Result`]; typed errors are raised with
//! `InstallerError::... .into()` so the single top-level handler can match on
//! them regardless of how much context was layered on the way up.

pub mod error;

pub use error::{ErrorContext, InstallerError, user_friendly_error};
