//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`IdentityKey`] - Validated 32-byte author key, hex encoded
//! - [`EventKind`] - The three event kinds this crate speaks, with wire codes
//! - [`TieBreak`] - Policy between matching announcements
//! - [`Locator`] - A parsed `owner:repository` clone locator
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use gitnostr::core::types::{IdentityKey, Locator};
//!
//! let key = IdentityKey::new("a".repeat(64)).unwrap();
//! assert_eq!(key.as_str().len(), 64);
//!
//! let locator = Locator::parse("alice:my:repo").unwrap();
//! assert_eq!(locator.identity_alias(), "alice");
//! assert_eq!(locator.repository_name(), "my:repo");
//!
//! assert!(IdentityKey::new("not-hex").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identity key: {0}")]
    InvalidIdentityKey(String),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("unknown event kind: {0}")]
    UnknownKind(u16),
}

/// Length of a hex-encoded identity key (32 bytes).
pub const IDENTITY_KEY_HEX_LEN: usize = 64;

/// The canonical public identifier of an event author.
///
/// Always stored lowercase so two spellings of the same key compare equal.
///
/// # Example
///
/// ```
/// use gitnostr::core::types::IdentityKey;
///
/// let upper = IdentityKey::new("AB".repeat(32)).unwrap();
/// let lower = IdentityKey::new("ab".repeat(32)).unwrap();
/// assert_eq!(upper, lower);
///
/// assert!(IdentityKey::new("ab".repeat(31)).is_err());
/// assert!(IdentityKey::new("zz".repeat(32)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create a new validated identity key.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidIdentityKey` unless the input is exactly
    /// 64 hex characters.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        if key.len() != IDENTITY_KEY_HEX_LEN {
            return Err(TypeError::InvalidIdentityKey(format!(
                "expected {} hex characters, got {}",
                IDENTITY_KEY_HEX_LEN,
                key.len()
            )));
        }
        hex::decode(&key).map_err(|e| TypeError::InvalidIdentityKey(e.to_string()))?;
        Ok(Self(key.to_ascii_lowercase()))
    }

    /// Get the key as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityKey> for String {
    fn from(key: IdentityKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The event kinds carried by this protocol.
///
/// Repository announcements exist in two coexisting wire formats; a
/// permission grant has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Permission grant, JSON in content
    PermissionGrant,
    /// Repository announcement, JSON in content
    LegacyRepository,
    /// Replaceable repository announcement keyed by the `d` tag
    TaggedRepository,
}

impl EventKind {
    /// Wire code for permission grants.
    pub const PERMISSION_GRANT_CODE: u16 = 50;
    /// Wire code for legacy repository announcements.
    pub const LEGACY_REPOSITORY_CODE: u16 = 51;
    /// Wire code for replaceable repository announcements.
    pub const TAGGED_REPOSITORY_CODE: u16 = 30617;

    /// The numeric kind used on the wire.
    pub fn code(&self) -> u16 {
        match self {
            EventKind::PermissionGrant => Self::PERMISSION_GRANT_CODE,
            EventKind::LegacyRepository => Self::LEGACY_REPOSITORY_CODE,
            EventKind::TaggedRepository => Self::TAGGED_REPOSITORY_CODE,
        }
    }

    /// Map a wire code back to a kind.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::UnknownKind` for codes this crate does not speak.
    pub fn from_code(code: u16) -> Result<Self, TypeError> {
        match code {
            Self::PERMISSION_GRANT_CODE => Ok(EventKind::PermissionGrant),
            Self::LEGACY_REPOSITORY_CODE => Ok(EventKind::LegacyRepository),
            Self::TAGGED_REPOSITORY_CODE => Ok(EventKind::TaggedRepository),
            other => Err(TypeError::UnknownKind(other)),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::PermissionGrant => write!(f, "permission-grant"),
            EventKind::LegacyRepository => write!(f, "legacy-repository"),
            EventKind::TaggedRepository => write!(f, "tagged-repository"),
        }
    }
}

/// How to choose between several matching repository announcements.
///
/// [`TieBreak::LastObserved`] keeps whichever matching event arrived last,
/// ignoring creation time. [`TieBreak::Newest`] applies replaceable-event
/// ordering: greatest `created_at`, then smallest event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Last event observed wins
    #[default]
    LastObserved,
    /// Newest `created_at` wins, ties to the smallest event id
    Newest,
}

/// A parsed `<identityAliasOrKey>:<repositoryName>` locator.
///
/// Splits on the first `:` only, so repository names may contain `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    identity_alias: String,
    repository_name: String,
}

impl Locator {
    /// Parse a locator string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidLocator` if there is no `:` or either side
    /// of the first `:` is empty.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let (alias, name) = input.split_once(':').ok_or_else(|| {
            TypeError::InvalidLocator(format!("'{}' is not of the form owner:repository", input))
        })?;

        if alias.is_empty() {
            return Err(TypeError::InvalidLocator(format!(
                "'{}' has an empty owner",
                input
            )));
        }
        if name.is_empty() {
            return Err(TypeError::InvalidLocator(format!(
                "'{}' has an empty repository name",
                input
            )));
        }

        Ok(Self {
            identity_alias: alias.to_string(),
            repository_name: name.to_string(),
        })
    }

    /// The owner part (alias or hex key).
    pub fn identity_alias(&self) -> &str {
        &self.identity_alias
    }

    /// The repository part, verbatim after the first `:`.
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }
}

impl std::str::FromStr for Locator {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.identity_alias, self.repository_name)
    }
}
