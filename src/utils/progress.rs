//! User-facing progress output
//!
//! Informational lines go to stdout with a fixed `[deno-install info]` prefix
//! so they are easy to grep in CI logs. Long steps (page fetch, download,
//! verification) additionally show an indicatif spinner on stderr when
//! progress is enabled.
//!
//! # Disabling
//!
//! Spinners are hidden when `--no-progress` is passed, when
//! `DENO_INSTALL_NO_PROGRESS` is set, or in quiet mode. Quiet mode also
//! suppresses the info lines; errors are never suppressed.

use crate::constants::INFO_PREFIX;
use colored::Colorize;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// Spinner for one pipeline step. Hidden when progress is disabled.
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    fn new(msg: String, visible: bool) -> Self {
        let inner = if visible {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            IndicatifBar::hidden()
        };
        inner.set_message(msg);
        Self {
            inner,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    pub fn finish(&self) {
        self.inner.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.inner.is_finished() {
            self.inner.finish_and_clear();
        }
    }
}

/// Writes progress for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
    progress: bool,
}

impl Reporter {
    pub const fn new(quiet: bool, progress: bool) -> Self {
        Self {
            quiet,
            progress: progress && !quiet,
        }
    }

    /// A reporter that prints nothing.
    pub const fn silent() -> Self {
        Self::new(true, false)
    }

    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", INFO_PREFIX.cyan(), msg.as_ref());
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", INFO_PREFIX.cyan(), msg.as_ref().green().bold());
        }
    }

    pub fn spinner(&self, msg: impl Into<String>) -> Spinner {
        Spinner::new(msg.into(), self.progress)
    }
}
