//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! User-facing lines go to stdout and respect the quiet flag. Diagnostics
//! go through `tracing`, not through here.

use std::fmt::Display;

use crate::bus::{PublishStatus, RelayStatus};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Describe one relay's answer to a publish.
///
/// # Example
///
/// ```
/// use gitnostr::bus::{PublishStatus, RelayStatus};
/// use gitnostr::ui::output::format_relay_status;
///
/// let line = format_relay_status("repository", &RelayStatus::new("file:///r", PublishStatus::Failed));
/// assert_eq!(line, "failed to publish repository to 'file:///r'.");
/// ```
pub fn format_relay_status(label: &str, status: &RelayStatus) -> String {
    match status.status {
        PublishStatus::Sent | PublishStatus::Succeeded => {
            format!("published {} to '{}'.", label, status.relay)
        }
        PublishStatus::Failed => format!("failed to publish {} to '{}'.", label, status.relay),
    }
}
