//! Error handling for the installer
//!
//! Every failure in the pipeline is expressed as an [`InstallerError`], a
//! closed set of kinds that the top-level handler can match exhaustively.
//! Steps propagate errors as [`anyhow::Error`] with added context; the
//! handler in `main.rs` recovers the typed kind with
//! [`user_friendly_error`] and prints it through [`ErrorContext::display`].
//!
//! # Error Categories
//!
//! - **Resolution**: [`InstallerError::UnsupportedPlatform`],
//!   [`InstallerError::AssetNotFound`], [`InstallerError::UrlUnresolvable`]
//! - **Transfer**: [`InstallerError::Network`], [`InstallerError::TransferFailed`]
//! - **Extraction**: [`InstallerError::ToolNotFound`], [`InstallerError::ToolFailed`]
//! - **Integration**: [`InstallerError::IntegrationFailed`]
//! - **Verification**: [`InstallerError::TestRunFailed`], [`InstallerError::VersionMismatch`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use deno_installer::core::{ErrorContext, InstallerError, user_friendly_error};
//!
//! let err = anyhow::Error::from(InstallerError::AssetNotFound {
//!     asset: "deno_linux_x64.gz".to_string(),
//!     page: "https://github.com/denoland/deno/releases/latest".to_string(),
//! });
//! user_friendly_error(err).display();
//! ```

use crate::constants::ERROR_PREFIX;
use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Closed taxonomy of installer failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallerError {
    #[error("Unsupported operating system {os}")]
    UnsupportedPlatform {
        os: String,
    },

    #[error("Invalid release tag '{tag}', expected vMAJOR.MINOR.PATCH")]
    InvalidTag {
        tag: String,
    },

    #[error("Unable to fetch from {url} after {attempts} requests")]
    UrlUnresolvable {
        url: String,
        attempts: u32,
    },

    #[error("Network error while {operation}: {reason}")]
    Network {
        operation: String,
        reason: String,
    },

    #[error("Unable to find {asset} @ {page}")]
    AssetNotFound {
        asset: String,
        page: String,
    },

    #[error("Failed to write download to {path}: {reason}")]
    TransferFailed {
        path: String,
        reason: String,
    },

    #[error("{tool} is not installed or not found in PATH")]
    ToolNotFound {
        tool: String,
    },

    #[error("{tool} failed with exit code {code}")]
    ToolFailed {
        tool: String,
        code: i32,
    },

    #[error("Integration failed while {operation} {path}: {reason}")]
    IntegrationFailed {
        operation: String,
        path: String,
        reason: String,
    },

    #[error("Test run failed: {reason}")]
    TestRunFailed {
        reason: String,
    },

    #[error("Version mismatch: expected {expected}, binary reported {reported:?}")]
    VersionMismatch {
        expected: String,
        reported: String,
    },

    #[error("Could not determine home directory")]
    HomeNotFound,

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    #[error("{message}")]
    Other {
        message: String,
    },
}

/// An [`InstallerError`] decorated with details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: InstallerError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: InstallerError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr under the fixed diagnostic prefix.
    pub fn display(&self) {
        let prefix = ERROR_PREFIX.red().bold();
        eprintln!("{prefix} {}", self.error);

        if let Some(details) = &self.details {
            for line in details.lines() {
                eprintln!("{prefix} {}", line.yellow());
            }
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{prefix} {}: {}", "suggestion".green(), suggestion);
        }

        eprintln!("{prefix} Installation failed");
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error reaching the top level into a displayable [`ErrorContext`].
///
/// Typed [`InstallerError`]s anywhere in the chain get a tailored suggestion;
/// the surrounding context messages are kept as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain: Vec<String> = error.chain().map(ToString::to_string).collect();

    if let Some(installer_error) = error.downcast_ref::<InstallerError>() {
        let own = installer_error.to_string();
        let context: Vec<&str> =
            chain.iter().map(String::as_str).filter(|msg| *msg != own).collect();
        let ctx = create_error_context(installer_error.clone());
        return if context.is_empty() {
            ctx
        } else {
            ctx.with_details(context.join("\n"))
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(InstallerError::Other {
            message: chain.join(": "),
        })
        .with_suggestion(
            "Check ownership of ~/.deno, or rerun with elevated permissions (sudo/Administrator)",
        );
    }

    let mut message = error.to_string();
    if chain.len() > 1 {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().skip(1).enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(InstallerError::Other {
        message,
    })
}

fn create_error_context(error: InstallerError) -> ErrorContext {
    match &error {
        InstallerError::UnsupportedPlatform { .. } => ErrorContext::new(error)
            .with_suggestion("Prebuilt deno binaries are published for Linux, macOS and Windows only"),
        InstallerError::InvalidTag { .. } => ErrorContext::new(error)
            .with_suggestion("Pass a tag such as v1.4.0, or omit it to install the latest release"),
        InstallerError::UrlUnresolvable { .. } | InstallerError::Network { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Check your internet connection and that github.com is reachable")
        }
        InstallerError::AssetNotFound { .. } => ErrorContext::new(error).with_suggestion(
            "The release may still be publishing its assets; retry in a few minutes or pick an older tag",
        ),
        InstallerError::TransferFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check free disk space in the temporary directory"),
        InstallerError::ToolNotFound { tool } => {
            let suggestion = format!("Install {tool} and make sure it is on your PATH");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        InstallerError::ToolFailed { .. } => ErrorContext::new(error)
            .with_suggestion("The downloaded archive may be corrupt; run the installer again"),
        InstallerError::IntegrationFailed { .. } => ErrorContext::new(error).with_suggestion(
            "Rerun with elevated permissions, or pass --no-link and add ~/.deno/bin to PATH yourself",
        ),
        InstallerError::TestRunFailed { .. } | InstallerError::VersionMismatch { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Any previous binary was restored; rerun with --verbose for details")
        }
        InstallerError::HomeNotFound => ErrorContext::new(error).with_suggestion(if cfg!(windows) {
            "Check that HOMEDRIVE/HOMEPATH or USERPROFILE are set"
        } else {
            "Check that the HOME environment variable is set"
        }),
        InstallerError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Fix or remove the installer config file (see --config)"),
        InstallerError::Other { .. } => ErrorContext::new(error),
    }
}
