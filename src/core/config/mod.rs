//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit `--config <path>`
//! 2. `$GIT_NOSTR_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/gitnostr/config.toml`
//! 4. `~/.gitnostr/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use gitnostr::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! for relay in config.relays() {
//!     println!("relay: {}", relay);
//! }
//! println!("publish deadline: {:?}", config.publish_timeout());
//! ```

pub mod schema;

pub use schema::{FileConfig, ResolveConfig, TimeoutsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{IdentityKey, TieBreak};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GIT_NOSTR_CONFIG";

/// Default publish deadline.
pub const DEFAULT_PUBLISH_SECS: u64 = 5;

/// Default resolve deadline.
pub const DEFAULT_RESOLVE_SECS: u64 = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied by accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: FileConfig,
    /// Path the file was loaded from (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Build a config from already-parsed contents.
    pub fn from_file_config(file: FileConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self {
            file,
            loaded_from: None,
        })
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the standard locations
    /// are searched and a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::search_path(),
        };

        let Some(path) = path else {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        };

        let file = Self::read_file_config(&path)?;
        file.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");

        Ok(Self {
            file,
            loaded_from: Some(path),
        })
    }

    /// Find the first existing config file in the standard locations.
    fn search_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitnostr/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".gitnostr/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Read and parse a config file.
    fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.gitnostr/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".gitnostr/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes to a temp file in the
    /// same directory and renames it into place.
    pub fn write(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Configured relay URLs (empty if none).
    pub fn relays(&self) -> &[String] {
        self.file.relays.as_deref().unwrap_or(&[])
    }

    /// Identity key stamped on published events.
    ///
    /// Validated at load time, so a present value always parses.
    pub fn identity(&self) -> Option<IdentityKey> {
        self.file
            .identity
            .as_deref()
            .and_then(|s| IdentityKey::new(s).ok())
    }

    /// Default clone base.
    pub fn git_ssh_base(&self) -> Option<&str> {
        self.file.git_ssh_base.as_deref()
    }

    /// Publish deadline.
    ///
    /// Defaults to 5 seconds.
    pub fn publish_timeout(&self) -> Duration {
        let secs = self
            .file
            .timeouts
            .as_ref()
            .and_then(|t| t.publish_secs)
            .unwrap_or(DEFAULT_PUBLISH_SECS);
        Duration::from_secs(secs)
    }

    /// Resolve deadline.
    ///
    /// Defaults to 10 seconds.
    pub fn resolve_timeout(&self) -> Duration {
        let secs = self
            .file
            .timeouts
            .as_ref()
            .and_then(|t| t.resolve_secs)
            .unwrap_or(DEFAULT_RESOLVE_SECS);
        Duration::from_secs(secs)
    }

    /// Tie-break policy between matching announcements.
    ///
    /// Defaults to last-observed.
    pub fn tie_break(&self) -> TieBreak {
        match self
            .file
            .resolve
            .as_ref()
            .and_then(|r| r.tie_break.as_deref())
        {
            Some("newest") => TieBreak::Newest,
            _ => TieBreak::LastObserved,
        }
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
