//! bus::spool
//!
//! Directory-backed relays.
//!
//! # Layout
//!
//! Each `file://<dir>` relay is a directory of JSON events:
//! - regular events are stored as `<event-id>.json`
//! - replaceable events (kinds 30000..40000) are stored once per
//!   `(author, kind, d-tag)` and only replaced by an event that is not older
//!
//! Events are not signed here. The configured identity is stamped as the
//! author, and stored ids are checked against their content on read.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::traits::{
    BusError, EventBus, EventStream, Filter, PublishStatus, RelayStatus, StatusStream,
    CHANNEL_CAPACITY,
};
use crate::core::types::IdentityKey;
use crate::protocol::event::{first_tag_value, Event};
use crate::protocol::{InboundEvent, UnsignedEvent};

/// URL scheme handled by this transport.
pub const SPOOL_SCHEME: &str = "file://";

/// One directory-backed relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolRelay {
    url: String,
    dir: PathBuf,
}

impl SpoolRelay {
    /// Parse a `file://` relay URL.
    ///
    /// # Errors
    ///
    /// Returns `BusError::UnsupportedRelay` for other schemes or an empty path.
    pub fn parse(url: &str) -> Result<Self, BusError> {
        let path = url
            .strip_prefix(SPOOL_SCHEME)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BusError::UnsupportedRelay(url.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            dir: PathBuf::from(path),
        })
    }

    /// The relay URL as configured.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// File name an event is stored under.
    fn file_name(event: &Event) -> String {
        if is_replaceable(event.kind) {
            let d = first_tag_value(&event.tags, "d").unwrap_or("");
            let key = format!("{}:{}:{}", event.pubkey, event.kind, d);
            format!("r-{}.json", hex::encode(Sha256::digest(key.as_bytes())))
        } else {
            format!("{}.json", event.id)
        }
    }

    /// Store an event, honouring replaceable semantics.
    async fn store(&self, event: &Event) -> Result<(), BusError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BusError::Io(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.dir.join(Self::file_name(event));

        if is_replaceable(event.kind) {
            if let Some(existing) = read_event(&path).await {
                if existing.created_at > event.created_at {
                    tracing::debug!(
                        relay = %self.url,
                        event_id = %event.id,
                        "newer replaceable event already stored"
                    );
                    return Ok(());
                }
            }
        }

        let json = serde_json::to_vec_pretty(event).map_err(|e| BusError::Io(e.to_string()))?;
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| BusError::Io(format!("{}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| BusError::Io(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Stream every stored event matching `filter` into `tx`.
    async fn scan(&self, filter: &Filter, tx: &mpsc::Sender<InboundEvent>) -> Result<(), BusError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(BusError::Io(format!("{}: {}", self.dir.display(), e))),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BusError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let Some(event) = read_event(&path).await else {
                tracing::warn!(relay = %self.url, path = %path.display(), "skipping unreadable event");
                continue;
            };

            if !event.has_valid_id() {
                tracing::warn!(relay = %self.url, event_id = %event.id, "skipping event with mismatched id");
                continue;
            }

            let Ok(inbound) = InboundEvent::try_from(event) else {
                continue;
            };

            if filter.matches_event(&inbound) && tx.send(inbound).await.is_err() {
                // Subscriber went away.
                return Ok(());
            }
        }

        Ok(())
    }
}

fn is_replaceable(kind: u16) -> bool {
    (30000..40000).contains(&kind)
}

async fn read_event(path: &Path) -> Option<Event> {
    let bytes = tokio::fs::read(path).await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// A pool of directory-backed relays.
#[derive(Debug, Clone)]
pub struct SpoolBus {
    relays: Vec<SpoolRelay>,
    author: Option<IdentityKey>,
}

impl SpoolBus {
    /// Create a bus over the given relays.
    ///
    /// `author` is required for publishing, not for subscribing.
    pub fn new(relays: Vec<SpoolRelay>, author: Option<IdentityKey>) -> Self {
        Self { relays, author }
    }
}

#[async_trait]
impl EventBus for SpoolBus {
    fn name(&self) -> &'static str {
        "spool"
    }

    async fn publish(&self, event: UnsignedEvent) -> Result<StatusStream, BusError> {
        let author = self.author.as_ref().ok_or(BusError::NoIdentity)?;
        if self.relays.is_empty() {
            return Err(BusError::NoRelays);
        }

        let event = event.authored_by(author);
        tracing::debug!(event_id = %event.id, kind = event.kind, "publishing");

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        for relay in self.relays.clone() {
            let tx = tx.clone();
            let event = event.clone();
            tokio::spawn(async move {
                let status = match relay.store(&event).await {
                    Ok(()) => PublishStatus::Succeeded,
                    Err(e) => {
                        tracing::warn!(relay = %relay.url, error = %e, "publish failed");
                        PublishStatus::Failed
                    }
                };
                let _ = tx.send(RelayStatus::new(relay.url, status)).await;
            });
        }

        Ok(rx)
    }

    async fn subscribe(&self, filter: Filter) -> Result<EventStream, BusError> {
        if self.relays.is_empty() {
            return Err(BusError::NoRelays);
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        for relay in self.relays.clone() {
            let tx = tx.clone();
            let filter = filter.clone();
            tokio::spawn(async move {
                if let Err(e) = relay.scan(&filter, &tx).await {
                    tracing::warn!(relay = %relay.url, error = %e, "subscription failed");
                }
            });
        }

        Ok(rx)
    }
}
