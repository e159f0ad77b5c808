//! identity::nip05
//!
//! NIP-05 lookups: `name@domain` resolves through
//! `https://<domain>/.well-known/nostr.json?name=<name>`, which answers
//! `{"names": {"<name>": "<hex key>"}}`. A bare `domain` is treated as
//! `_@domain`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

use super::{IdentityError, IdentityResolver};
use crate::core::types::IdentityKey;

/// User-Agent header value for lookups.
const USER_AGENT_VALUE: &str = "git-nostr";

#[derive(Debug, Deserialize)]
struct WellKnown {
    #[serde(default)]
    names: HashMap<String, String>,
}

/// Resolver for hex keys and NIP-05 identifiers.
#[derive(Debug, Clone)]
pub struct Nip05Resolver {
    client: Client,
    /// Replaces `https://<domain>` when set (for tests and proxies)
    base_url: Option<String>,
}

impl Default for Nip05Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Nip05Resolver {
    /// Create a resolver that queries each identifier's own domain.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
        }
    }

    /// Create a resolver that sends every lookup to `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    /// Split `name@domain` into its parts, lowercasing the name.
    fn split_identifier(alias: &str) -> Option<(String, &str)> {
        let (name, domain) = match alias.rsplit_once('@') {
            Some((name, domain)) => (name, domain),
            None => ("_", alias),
        };
        if name.is_empty() || domain.is_empty() || (!domain.contains('.') && domain != "localhost")
        {
            return None;
        }
        Some((name.to_ascii_lowercase(), domain))
    }

    fn well_known_url(&self, domain: &str) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", domain));
        format!("{}/.well-known/nostr.json", base)
    }

    async fn lookup(&self, alias: &str, name: &str, domain: &str) -> Result<IdentityKey, IdentityError> {
        let url = self.well_known_url(domain);
        tracing::debug!(%url, name, "NIP-05 lookup");

        let response = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .header(reqwest::header::USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(IdentityError::NotFound(alias.to_string())),
            status => {
                return Err(IdentityError::Network(format!(
                    "{} answered {}",
                    domain, status
                )))
            }
        }

        let well_known: WellKnown = response
            .json()
            .await
            .map_err(|e| IdentityError::Network(format!("invalid nostr.json: {}", e)))?;

        let hex = well_known
            .names
            .get(name)
            .ok_or_else(|| IdentityError::NotFound(alias.to_string()))?;

        IdentityKey::new(hex.as_str())
            .map_err(|e| IdentityError::Network(format!("{} published {}", domain, e)))
    }
}

#[async_trait]
impl IdentityResolver for Nip05Resolver {
    async fn resolve(&self, alias: &str) -> Result<IdentityKey, IdentityError> {
        if let Ok(key) = IdentityKey::new(alias) {
            return Ok(key);
        }

        let (name, domain) = Self::split_identifier(alias)
            .ok_or_else(|| IdentityError::NotFound(alias.to_string()))?;

        self.lookup(alias, &name, domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_named_identifier() {
        assert_eq!(
            Nip05Resolver::split_identifier("Bob@example.com"),
            Some(("bob".to_string(), "example.com"))
        );
        assert_eq!(
            Nip05Resolver::split_identifier("steve@localhost"),
            Some(("steve".to_string(), "localhost"))
        );
    }

    #[test]
    fn split_bare_domain() {
        assert_eq!(
            Nip05Resolver::split_identifier("example.com"),
            Some(("_".to_string(), "example.com"))
        );
    }

    #[test]
    fn split_rejects_plain_names() {
        assert_eq!(Nip05Resolver::split_identifier("alice"), None);
        assert_eq!(Nip05Resolver::split_identifier("@example.com"), None);
        assert_eq!(Nip05Resolver::split_identifier("alice@"), None);
    }

    #[test]
    fn well_known_url_uses_domain() {
        let resolver = Nip05Resolver::new();
        assert_eq!(
            resolver.well_known_url("example.com"),
            "https://example.com/.well-known/nostr.json"
        );

        let proxied = Nip05Resolver::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            proxied.well_known_url("example.com"),
            "http://127.0.0.1:8080/.well-known/nostr.json"
        );
    }

    #[tokio::test]
    async fn hex_key_needs_no_lookup() {
        let resolver = Nip05Resolver::with_base_url("http://127.0.0.1:1");
        let key = resolver.resolve(&"0a".repeat(32)).await.unwrap();
        assert_eq!(key.as_str(), "0a".repeat(32));
    }

    #[tokio::test]
    async fn plain_name_is_not_found() {
        let resolver = Nip05Resolver::with_base_url("http://127.0.0.1:1");
        assert_eq!(
            resolver.resolve("alice").await,
            Err(IdentityError::NotFound("alice".to_string()))
        );
    }
}
