//! protocol::permission
//!
//! Permission grants. One wire representation: JSON content, no tags.
//!
//! The permission label is opaque here; access control interprets it.

use serde::{Deserialize, Serialize};

use super::event::{InboundEvent, UnsignedEvent};
use super::CodecError;
use crate::core::types::{EventKind, IdentityKey};
use crate::core::validate::is_valid_repository_name;

/// One access grant from a repository owner to a target identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(rename = "RepositoryName", alias = "repositoryName")]
    pub repository_name: String,

    #[serde(rename = "TargetPubKey", alias = "targetPubKey")]
    pub target_identity: IdentityKey,

    #[serde(rename = "Permission", alias = "permission")]
    pub permission: String,
}

/// Encode a grant for publishing.
///
/// # Errors
///
/// Returns `CodecError::InvalidName` if the repository name fails the wire rules.
pub fn encode_grant(grant: &PermissionGrant) -> Result<UnsignedEvent, CodecError> {
    if !is_valid_repository_name(&grant.repository_name) {
        return Err(CodecError::InvalidName(grant.repository_name.clone()));
    }

    let content =
        serde_json::to_string(grant).map_err(|e| CodecError::MalformedContent(e.to_string()))?;

    Ok(UnsignedEvent::now(
        EventKind::PermissionGrant,
        Vec::new(),
        content,
    ))
}

/// Decode a grant from an inbound event.
pub fn decode_grant(event: &InboundEvent) -> Result<PermissionGrant, CodecError> {
    if event.kind != EventKind::PermissionGrant {
        return Err(CodecError::WrongKind {
            expected: "permission grant",
            found: event.kind,
        });
    }

    serde_json::from_str(&event.content).map_err(|e| CodecError::MalformedContent(e.to_string()))
}
