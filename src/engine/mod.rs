//! engine
//!
//! Publishing facts and resolving repositories against an event bus.
//!
//! # Architecture
//!
//! Both directions share one shape: a single control flow races a fan-in
//! channel against a deadline timer. Relay handlers only push into the
//! channel; the accumulator (success flag or best candidate) belongs to the
//! one call that created it.
//!
//! - [`publisher`]: encode a fact, publish it, fold relay statuses
//! - [`resolver`]: resolve an owner, subscribe, fold announcements
//! - [`clone`]: build the clone URL and run the clone
//!
//! # Errors
//!
//! Corrupted or undecodable events are recovered inside a fold and never
//! surface. Only identity failure and a deadline with no candidate end a
//! resolution; a publish with no acknowledgement is
//! [`EngineError::PublishUnconfirmed`], which is not proof of rejection.
//!
//! # Example
//!
//! ```ignore
//! use gitnostr::engine::{publisher, Fact, Resolver};
//!
//! publisher::publish(bus, &Fact::Repository(fact), Duration::from_secs(5)).await?;
//!
//! let resolved = Resolver::new(bus, &identities)
//!     .resolve("alice@example.com", "public", Duration::from_secs(10))
//!     .await?;
//! ```

pub mod clone;
pub mod publisher;
pub mod resolver;

pub use clone::{clone_locator, CloneError, CloneRunner, CloneTarget, GitCloneRunner};
pub use publisher::{publish, publish_with, Fact, PublishOutcome};
pub use crate::core::types::TieBreak;
pub use resolver::{ResolvedRepository, Resolver};

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::bus::BusError;
use crate::core::config::Config;
use crate::core::types::IdentityKey;
use crate::identity::IdentityError;
use crate::protocol::CodecError;

/// Errors from publish and resolve operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The repository name fails the wire rules; nothing was sent.
    #[error("invalid repository name '{0}': must be non-empty and contain no space, '/' or '.'")]
    InvalidName(String),

    /// The fact could not be encoded.
    #[error(transparent)]
    Codec(CodecError),

    /// Alias resolution failed; fatal to a resolution.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The transport refused the operation.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// No relay acknowledged before the deadline.
    #[error("could not be confirmed by any relay before the deadline")]
    PublishUnconfirmed {
        /// Relays that explicitly failed
        failed: Vec<String>,
    },

    /// No matching announcement arrived before the deadline.
    #[error("repository '{name}' not found for {owner}")]
    RepositoryNotFound { owner: IdentityKey, name: String },

    /// The clone could not be prepared or run.
    #[error(transparent)]
    CloneFailed(#[from] CloneError),
}

impl From<CodecError> for EngineError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::InvalidName(name) => EngineError::InvalidName(name),
            other => EngineError::Codec(other),
        }
    }
}

/// Furthest ahead a publish or resolve deadline is placed.
pub const MAX_DEADLINE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// The instant `deadline` from now, capped at [`MAX_DEADLINE`].
pub(crate) fn deadline_from_now(deadline: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(deadline.min(MAX_DEADLINE)).unwrap_or(now)
}

/// Execution context shared by command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory clones are created in
    pub cwd: Option<PathBuf>,
    /// Loaded configuration (CLI overrides already applied)
    pub config: Config,
    /// Enable debug output
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_name_codec_error_maps_to_invalid_name() {
        let err: EngineError = CodecError::InvalidName("a b".to_string()).into();
        assert_eq!(err, EngineError::InvalidName("a b".to_string()));

        let err: EngineError = CodecError::MissingIdentifier.into();
        assert!(matches!(err, EngineError::Codec(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_capped() {
        let now = Instant::now();
        assert_eq!(deadline_from_now(Duration::from_secs(u64::MAX)), now + MAX_DEADLINE);
        assert_eq!(deadline_from_now(Duration::from_secs(3)), now + Duration::from_secs(3));
    }

    #[test]
    fn error_display() {
        let owner = IdentityKey::new("ab".repeat(32)).unwrap();
        assert_eq!(
            EngineError::RepositoryNotFound {
                owner: owner.clone(),
                name: "public".to_string()
            }
            .to_string(),
            format!("repository 'public' not found for {}", owner)
        );
        assert_eq!(
            EngineError::Identity(IdentityError::NotFound("bob".into())).to_string(),
            "identity not found: bob"
        );
        assert_eq!(
            EngineError::PublishUnconfirmed { failed: vec![] }.to_string(),
            "could not be confirmed by any relay before the deadline"
        );
    }
}
