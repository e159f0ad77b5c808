//! identity
//!
//! Turning a human alias into a canonical identity key.
//!
//! # Accepted Forms
//!
//! - A 64-hex key, returned as-is (lowercased)
//! - `name@domain`, looked up via NIP-05 (`/.well-known/nostr.json`)
//!
//! Anything else is `IdentityError::NotFound`.
//!
//! # Modules
//!
//! - [`nip05`]: HTTP resolver used by the CLI
//! - [`StaticResolver`]: in-memory aliases for tests

pub mod nip05;

pub use nip05::Nip05Resolver;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::core::types::IdentityKey;

/// Errors from identity resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The alias does not resolve to any identity.
    #[error("identity not found: {0}")]
    NotFound(String),

    /// The lookup could not be completed.
    #[error("identity lookup failed: {0}")]
    Network(String),
}

/// Resolves an alias or key to an [`IdentityKey`].
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, alias: &str) -> Result<IdentityKey, IdentityError>;
}

/// In-memory resolver. Hex keys pass through; aliases come from a map.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    aliases: HashMap<String, IdentityKey>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias.
    pub fn with_alias(mut self, alias: impl Into<String>, key: IdentityKey) -> Self {
        self.aliases.insert(alias.into(), key);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self, alias: &str) -> Result<IdentityKey, IdentityError> {
        if let Ok(key) = IdentityKey::new(alias) {
            return Ok(key);
        }
        self.aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(alias.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_resolver_passes_hex_through() {
        let resolver = StaticResolver::new();
        let key = resolver.resolve(&"AB".repeat(32)).await.unwrap();
        assert_eq!(key.as_str(), "ab".repeat(32));
    }

    #[tokio::test]
    async fn static_resolver_uses_aliases() {
        let alice = IdentityKey::new("aa".repeat(32)).unwrap();
        let resolver = StaticResolver::new().with_alias("alice", alice.clone());

        assert_eq!(resolver.resolve("alice").await.unwrap(), alice);
        assert_eq!(
            resolver.resolve("bob").await,
            Err(IdentityError::NotFound("bob".to_string()))
        );
    }
}
