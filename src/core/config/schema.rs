//! core::config::schema
//!
//! Configuration schema types.
//!
//! Located at (in order of precedence):
//! 1. `$GIT_NOSTR_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitnostr/config.toml`
//! 3. `~/.gitnostr/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., identity must be a 64-hex key).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::IdentityKey;

/// Global configuration.
///
/// # Example
///
/// ```toml
/// relays = ["file:///var/spool/relay-a", "file:///var/spool/relay-b"]
/// identity = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d"
/// git_ssh_base = "git@gitnostr.example"
///
/// [timeouts]
/// publish_secs = 5
/// resolve_secs = 10
///
/// [resolve]
/// tie_break = "last-observed"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Relay URLs to publish to and subscribe from
    pub relays: Option<Vec<String>>,

    /// Hex identity key stamped on published events
    pub identity: Option<String>,

    /// Default clone base, also announced as the `clone` tag
    pub git_ssh_base: Option<String>,

    /// Deadlines for publish and resolve
    pub timeouts: Option<TimeoutsConfig>,

    /// Resolution policy
    pub resolve: Option<ResolveConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(identity) = &self.identity {
            IdentityKey::new(identity.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid identity: {}", e)))?;
        }

        if let Some(relays) = &self.relays {
            if relays.iter().any(|r| r.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "relay URLs cannot be empty".to_string(),
                ));
            }
        }

        if let Some(base) = &self.git_ssh_base {
            if base.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_ssh_base cannot be empty".to_string(),
                ));
            }
        }

        if let Some(timeouts) = &self.timeouts {
            timeouts.validate()?;
        }

        if let Some(resolve) = &self.resolve {
            resolve.validate()?;
        }

        Ok(())
    }
}

/// Deadline settings, in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsConfig {
    /// How long to wait for relay acknowledgements
    pub publish_secs: Option<u64>,

    /// How long to collect repository announcements
    pub resolve_secs: Option<u64>,
}

impl TimeoutsConfig {
    /// Longest accepted deadline (one day).
    pub const MAX_SECS: u64 = 24 * 60 * 60;

    /// Validate the timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("timeouts.publish_secs", self.publish_secs),
            ("timeouts.resolve_secs", self.resolve_secs),
        ] {
            if let Some(secs) = value {
                Self::check_secs(key, secs)?;
            }
        }
        Ok(())
    }

    /// Check one deadline value in seconds.
    pub fn check_secs(key: &str, secs: u64) -> Result<(), ConfigError> {
        if secs == 0 || secs > Self::MAX_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "{} must be between 1 and {} seconds",
                key,
                Self::MAX_SECS
            )));
        }
        Ok(())
    }
}

/// Resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Tie-break between matching announcements ("last-observed" or "newest")
    pub tie_break: Option<String>,
}

impl ResolveConfig {
    /// Valid tie-break policies.
    pub const VALID_TIE_BREAKS: &'static [&'static str] = &["last-observed", "newest"];

    /// Validate the resolve settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(policy) = &self.tie_break {
            if !Self::VALID_TIE_BREAKS.contains(&policy.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid tie_break '{}', must be one of: {}",
                    policy,
                    Self::VALID_TIE_BREAKS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
