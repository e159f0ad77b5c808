//! core::validate
//!
//! Repository name rules and structural checks for inbound events.
//!
//! # Features
//!
//! - Validate repository names before anything is published
//! - Reject structurally corrupted repository events before they are trusted
//!
//! A passing corruption check says nothing about authenticity. Signatures
//! are verified by the transport before events reach this crate.

use crate::core::types::IDENTITY_KEY_HEX_LEN;

/// Characters that may never appear in a repository name.
pub const FORBIDDEN_NAME_CHARS: [char; 3] = [' ', '/', '.'];

/// Check whether a repository name is acceptable on the wire.
///
/// A name is valid when it is non-empty and contains none of
/// space, `/` or `.`.
///
/// # Example
///
/// ```
/// use gitnostr::core::validate::is_valid_repository_name;
///
/// assert!(is_valid_repository_name("public"));
/// assert!(is_valid_repository_name("my:repo"));
/// assert!(!is_valid_repository_name(""));
/// assert!(!is_valid_repository_name("has space"));
/// assert!(!is_valid_repository_name("a/b"));
/// assert!(!is_valid_repository_name("repo.git"));
/// ```
pub fn is_valid_repository_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(FORBIDDEN_NAME_CHARS)
}

/// Check whether a repository event is structurally corrupted.
///
/// Returns `true` (reject) when the repository name is empty or
/// all-whitespace, or when the publisher key is not exactly 64 hex
/// characters.
///
/// # Example
///
/// ```
/// use gitnostr::core::validate::is_corrupted_repository_event;
///
/// let key = "a".repeat(64);
/// assert!(!is_corrupted_repository_event("id", "public", &key));
/// assert!(is_corrupted_repository_event("id", "   ", &key));
/// assert!(is_corrupted_repository_event("id", "public", "abc"));
/// ```
pub fn is_corrupted_repository_event(
    event_id: &str,
    repository_name: &str,
    publisher_hex: &str,
) -> bool {
    if repository_name.trim().is_empty() {
        tracing::debug!(event_id, "repository event has an empty name");
        return true;
    }

    if publisher_hex.len() != IDENTITY_KEY_HEX_LEN {
        tracing::debug!(event_id, publisher = publisher_hex, "publisher key has the wrong length");
        return true;
    }

    if hex::decode(publisher_hex).is_err() {
        tracing::debug!(event_id, publisher = publisher_hex, "publisher key is not hex");
        return true;
    }

    false
}
