//! protocol::repository
//!
//! Repository announcements in both wire formats.
//!
//! # Formats
//!
//! - **Legacy**: the whole [`RepositoryFact`] is JSON in the event content.
//! - **Tagged**: the name travels in the `d` tag (the replaceable-event key),
//!   the clone base in an optional `clone` tag, and content is empty.
//!   Visibility defaults to public-read, no public-write. A JSON body in the
//!   content is accepted as a transitional hybrid: its visibility and clone
//!   base apply, but the `d` tag always names the repository.
//!
//! New announcements are always written in the tagged format.

use serde::{Deserialize, Serialize};

use super::event::{first_tag_value, InboundEvent, Tag, UnsignedEvent};
use super::CodecError;
use crate::core::types::EventKind;
use crate::core::validate::is_valid_repository_name;

/// Tag carrying the repository name (replaceable-event identifier).
pub const IDENTIFIER_TAG: &str = "d";

/// Tag carrying the clone base.
pub const CLONE_TAG: &str = "clone";

/// The announced existence, location, and visibility of one repository.
///
/// JSON field names follow the legacy producers. Reading goes through
/// [`FactBody`], which also accepts camelCase and short spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FactBody")]
pub struct RepositoryFact {
    #[serde(rename = "RepositoryName")]
    pub name: String,

    #[serde(rename = "GitSshBase", skip_serializing_if = "Option::is_none")]
    pub clone_base: Option<String>,

    #[serde(rename = "PublicRead")]
    pub public_read: bool,

    #[serde(rename = "PublicWrite")]
    pub public_write: bool,
}

/// Every spelling seen in the wild, each as its own field so a body carrying
/// two spellings of one field still parses. Legacy names win.
#[derive(Deserialize)]
struct FactBody {
    #[serde(rename = "RepositoryName")]
    repository_name: Option<String>,
    #[serde(rename = "repositoryName")]
    repository_name_camel: Option<String>,
    name: Option<String>,

    #[serde(rename = "GitSshBase")]
    git_ssh_base: Option<String>,
    #[serde(rename = "gitSshBase")]
    git_ssh_base_camel: Option<String>,
    #[serde(rename = "cloneBase")]
    clone_base: Option<String>,

    #[serde(rename = "PublicRead")]
    public_read: Option<bool>,
    #[serde(rename = "publicRead")]
    public_read_camel: Option<bool>,

    #[serde(rename = "PublicWrite")]
    public_write: Option<bool>,
    #[serde(rename = "publicWrite")]
    public_write_camel: Option<bool>,
}

impl From<FactBody> for RepositoryFact {
    fn from(body: FactBody) -> Self {
        Self {
            name: body
                .repository_name
                .or(body.repository_name_camel)
                .or(body.name)
                .unwrap_or_default(),
            clone_base: body
                .git_ssh_base
                .or(body.git_ssh_base_camel)
                .or(body.clone_base),
            public_read: body.public_read.or(body.public_read_camel).unwrap_or(false),
            public_write: body.public_write.or(body.public_write_camel).unwrap_or(false),
        }
    }
}

impl RepositoryFact {
    /// A fact with tagged-format visibility defaults.
    pub fn new(name: impl Into<String>, clone_base: Option<String>) -> Self {
        Self {
            name: name.into(),
            clone_base,
            public_read: true,
            public_write: false,
        }
    }

    /// Parse a legacy JSON body.
    fn from_json(content: &str) -> Result<Self, CodecError> {
        let mut fact: RepositoryFact = serde_json::from_str(content)
            .map_err(|e| CodecError::MalformedContent(e.to_string()))?;
        fact.clone_base = fact.clone_base.filter(|b| !b.is_empty());
        Ok(fact)
    }
}

/// Encode a new repository announcement in the tagged format.
///
/// # Errors
///
/// Returns `CodecError::InvalidName` if the name fails the wire rules.
pub fn encode_announcement(fact: &RepositoryFact) -> Result<UnsignedEvent, CodecError> {
    if !is_valid_repository_name(&fact.name) {
        return Err(CodecError::InvalidName(fact.name.clone()));
    }

    let mut tags = vec![Tag::single(IDENTIFIER_TAG, fact.name.as_str())];
    if let Some(base) = fact.clone_base.as_deref().filter(|b| !b.is_empty()) {
        tags.push(Tag::single(CLONE_TAG, base));
    }

    Ok(UnsignedEvent::now(
        EventKind::TaggedRepository,
        tags,
        String::new(),
    ))
}

/// Decode a repository announcement of either format.
///
/// Dispatches purely on the event's declared kind.
///
/// # Errors
///
/// - `WrongKind` for non-repository events
/// - `MissingIdentifier` for tagged events without a `d` tag
/// - `MalformedContent` for legacy events whose content is not a fact
pub fn decode_repository(event: &InboundEvent) -> Result<RepositoryFact, CodecError> {
    match event.kind {
        EventKind::TaggedRepository => decode_tagged(event),
        EventKind::LegacyRepository => RepositoryFact::from_json(&event.content),
        other => Err(CodecError::WrongKind {
            expected: "repository",
            found: other,
        }),
    }
}

/// A `clone` tag survives an unreadable body; only a readable body replaces it.
fn decode_tagged(event: &InboundEvent) -> Result<RepositoryFact, CodecError> {
    let name = first_tag_value(&event.tags, IDENTIFIER_TAG).ok_or(CodecError::MissingIdentifier)?;
    let tag_clone_base = first_tag_value(&event.tags, CLONE_TAG)
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    if !event.content.is_empty() {
        match RepositoryFact::from_json(&event.content) {
            Ok(mut hybrid) => {
                hybrid.name = name.to_string();
                hybrid.clone_base = hybrid.clone_base.or(tag_clone_base);
                return Ok(hybrid);
            }
            Err(e) => {
                tracing::debug!(event_id = %event.id, error = %e, "ignoring unreadable tagged content");
            }
        }
    }

    Ok(RepositoryFact::new(name, tag_clone_base))
}
