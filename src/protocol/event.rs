//! protocol::event
//!
//! Wire-level events.
//!
//! # Types
//!
//! - [`Event`] - An authored event as stored by relays
//! - [`UnsignedEvent`] - An encoded fact awaiting an author from the transport
//! - [`InboundEvent`] - A received event with a kind this crate understands
//! - [`Tag`] - One `[key, value...]` entry of an event's tag list
//!
//! # Event Ids
//!
//! The id is the hex SHA-256 of the canonical JSON array
//! `[0, pubkey, created_at, kind, tags, content]`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::types::{EventKind, IdentityKey, TypeError};

/// One entry in an event's tag list.
///
/// Serialized as a flat JSON array `[key, value, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tag {
    key: String,
    values: Vec<String>,
}

impl Tag {
    /// Create a tag with a single value.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    /// The tag key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The first value, if any.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

impl From<Vec<String>> for Tag {
    fn from(mut raw: Vec<String>) -> Self {
        if raw.is_empty() {
            return Self {
                key: String::new(),
                values: Vec::new(),
            };
        }
        let key = raw.remove(0);
        Self { key, values: raw }
    }
}

impl From<Tag> for Vec<String> {
    fn from(tag: Tag) -> Self {
        let mut raw = Vec::with_capacity(tag.values.len() + 1);
        raw.push(tag.key);
        raw.extend(tag.values);
        raw
    }
}

/// Find the first value of the first tag with `key`.
pub fn first_tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter().find(|t| t.key() == key).and_then(Tag::value)
}

/// An authored event in its stored form.
///
/// `pubkey` is kept as a raw string: inbound events may be structurally
/// corrupted and are checked before anything trusts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl Event {
    /// Compute the canonical id for the given fields.
    pub fn compute_id(
        pubkey: &str,
        created_at: i64,
        kind: u16,
        tags: &[Tag],
        content: &str,
    ) -> String {
        let canonical = serde_json::json!([0, pubkey, created_at, kind, tags, content]);
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        hex::encode(digest)
    }

    /// Whether the stored id matches the event's fields.
    pub fn has_valid_id(&self) -> bool {
        self.id
            == Self::compute_id(
                &self.pubkey,
                self.created_at,
                self.kind,
                &self.tags,
                &self.content,
            )
    }
}

/// An encoded fact that has not been authored yet.
///
/// The transport stamps the author identity (and signs, where it signs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEvent {
    pub kind: EventKind,
    pub created_at: i64,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl UnsignedEvent {
    /// Create an event stamped with the current time.
    pub fn now(kind: EventKind, tags: Vec<Tag>, content: String) -> Self {
        Self {
            kind,
            created_at: chrono::Utc::now().timestamp(),
            tags,
            content,
        }
    }

    /// Attach an author and compute the event id.
    pub fn authored_by(self, author: &IdentityKey) -> Event {
        let kind = self.kind.code();
        let id = Event::compute_id(
            author.as_str(),
            self.created_at,
            kind,
            &self.tags,
            &self.content,
        );
        Event {
            id,
            pubkey: author.as_str().to_string(),
            created_at: self.created_at,
            kind,
            tags: self.tags,
            content: self.content,
        }
    }
}

/// A received event whose kind this crate understands.
///
/// Transient: owned by a single fold pass and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub id: String,
    pub kind: EventKind,
    pub publisher: String,
    pub created_at: i64,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl TryFrom<Event> for InboundEvent {
    type Error = TypeError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let kind = EventKind::from_code(event.kind)?;
        Ok(Self {
            id: event.id,
            kind,
            publisher: event.pubkey,
            created_at: event.created_at,
            tags: event.tags,
            content: event.content,
        })
    }
}
