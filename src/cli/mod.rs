//! cli
//!
//! Command-line interface layer for git-nostr.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and apply flag overrides
//! - Install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds an
//! [`engine::Context`], and dispatches to handlers that call into
//! [`crate::engine`]. Logging goes to stderr, filtered by `GIT_NOSTR_LOG`
//! (defaulting to `debug` with `--debug`, `warn` otherwise).

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::{Config, TimeoutsConfig};
use crate::engine;
use anyhow::{Context as _, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "GIT_NOSTR_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = build_context(&cli)?;

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_logging(debug: bool) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load configuration and fold the global flags into a context.
pub fn build_context(cli: &Cli) -> Result<engine::Context> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    if !cli.relays.is_empty() {
        config.file.relays = Some(cli.relays.clone());
    }

    if let Some(secs) = cli.timeout {
        TimeoutsConfig::check_secs("--timeout", secs)?;
        config.file.timeouts = Some(TimeoutsConfig {
            publish_secs: Some(secs),
            resolve_secs: Some(secs),
        });
    }

    Ok(engine::Context {
        cwd: cli.cwd.clone(),
        config,
        debug: cli.debug,
        quiet: cli.quiet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn flags_override_file_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "relays = [\"file:///from/file\"]\n[timeouts]\npublish_secs = 9\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "git-nostr",
            "--config",
            path.to_str().unwrap(),
            "--relay",
            "file:///from/flag",
            "--timeout",
            "2",
            "config",
            "list",
        ])
        .unwrap();

        let ctx = build_context(&cli).unwrap();
        assert_eq!(ctx.config.relays(), ["file:///from/flag".to_string()]);
        assert_eq!(ctx.config.publish_timeout(), Duration::from_secs(2));
        assert_eq!(ctx.config.resolve_timeout(), Duration::from_secs(2));
        assert_eq!(ctx.config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn huge_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let cli = Cli::try_parse_from([
            "git-nostr",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "18446744073709551615",
            "config",
            "list",
        ])
        .unwrap();

        let err = build_context(&cli).unwrap_err();
        assert!(err.to_string().contains("--timeout must be between 1 and"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let cli = Cli::try_parse_from([
            "git-nostr",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "0",
            "config",
            "list",
        ])
        .unwrap();

        assert!(build_context(&cli).is_err());
    }
}
