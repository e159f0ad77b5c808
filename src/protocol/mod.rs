//! protocol
//!
//! Encoding and decoding of repository announcements and permission grants.
//!
//! # Modules
//!
//! - [`event`]: Wire events, tags, and event ids
//! - [`repository`]: Legacy and tagged repository announcements
//! - [`permission`]: Permission grants
//!
//! Decoding never panics on hostile input. A [`CodecError`] means the event
//! is unusable, not that its publisher is illegitimate.

pub mod event;
pub mod permission;
pub mod repository;

pub use event::{Event, InboundEvent, Tag, UnsignedEvent};
pub use permission::{decode_grant, encode_grant, PermissionGrant};
pub use repository::{decode_repository, encode_announcement, RepositoryFact};

use thiserror::Error;

use crate::core::types::EventKind;

/// Errors from encoding or decoding events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The repository name fails the wire rules.
    #[error("invalid repository name '{0}': must be non-empty and contain no space, '/' or '.'")]
    InvalidName(String),

    /// The event kind is not the one being decoded.
    #[error("expected a {expected} event, found {found}")]
    WrongKind {
        expected: &'static str,
        found: EventKind,
    },

    /// A tagged announcement has no `d` tag.
    #[error("tagged repository event has no 'd' tag")]
    MissingIdentifier,

    /// The content does not parse as the expected payload.
    #[error("malformed content: {0}")]
    MalformedContent(String),
}
