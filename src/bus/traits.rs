//! bus::traits
//!
//! EventBus trait definition for relay-based event transports.
//!
//! # Design
//!
//! The `EventBus` trait is async because publishing and subscribing involve
//! network (or disk) I/O against many independent relays. Both operations
//! hand back a fan-in channel: every relay handler pushes into the same
//! sender, and exactly one consumer drains the receiver.
//!
//! Neither stream promises to close. Callers impose their own deadline.
//!
//! # Example
//!
//! ```ignore
//! use gitnostr::bus::{EventBus, Filter};
//! use gitnostr::core::types::EventKind;
//!
//! async fn watch(bus: &dyn EventBus, author: IdentityKey) -> Result<(), BusError> {
//!     let mut events = bus
//!         .subscribe(Filter::new([EventKind::TaggedRepository], [author]))
//!         .await?;
//!     while let Some(event) = events.recv().await {
//!         println!("{} from {}", event.id, event.publisher);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::types::{EventKind, IdentityKey};
use crate::protocol::{InboundEvent, UnsignedEvent};

/// Buffer size for fan-in channels.
pub const CHANNEL_CAPACITY: usize = 64;

/// Errors from bus operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// No relays are configured.
    #[error("no relays configured")]
    NoRelays,

    /// A relay URL uses a scheme this transport cannot reach.
    #[error("unsupported relay '{0}'")]
    UnsupportedRelay(String),

    /// Publishing requires an author identity.
    #[error("no identity configured for publishing")]
    NoIdentity,

    /// I/O failure while talking to a relay.
    #[error("relay I/O error: {0}")]
    Io(String),
}

/// Outcome reported by one relay for one published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// The event left for the relay
    Sent,
    /// The relay acknowledged the event
    Succeeded,
    /// The relay rejected the event or could not be reached
    Failed,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStatus::Sent => write!(f, "sent"),
            PublishStatus::Succeeded => write!(f, "succeeded"),
            PublishStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A publish status tagged with the relay that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStatus {
    pub relay: String,
    pub status: PublishStatus,
}

impl RelayStatus {
    pub fn new(relay: impl Into<String>, status: PublishStatus) -> Self {
        Self {
            relay: relay.into(),
            status,
        }
    }
}

/// Subscription filter. An empty set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub kinds: Vec<EventKind>,
    pub authors: Vec<IdentityKey>,
}

impl Filter {
    /// Create a filter over the given kinds and authors.
    pub fn new(
        kinds: impl IntoIterator<Item = EventKind>,
        authors: impl IntoIterator<Item = IdentityKey>,
    ) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            authors: authors.into_iter().collect(),
        }
    }

    /// Filter for repository announcements (both formats) by one author.
    pub fn repositories_by(author: IdentityKey) -> Self {
        Self::new(
            [EventKind::LegacyRepository, EventKind::TaggedRepository],
            [author],
        )
    }

    /// Check a kind and publisher against the filter.
    pub fn matches(&self, kind: EventKind, publisher: &str) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.contains(&kind);
        let author_ok = self.authors.is_empty()
            || self
                .authors
                .iter()
                .any(|a| a.as_str().eq_ignore_ascii_case(publisher));
        kind_ok && author_ok
    }

    /// Check an inbound event against the filter.
    pub fn matches_event(&self, event: &InboundEvent) -> bool {
        self.matches(event.kind, &event.publisher)
    }
}

/// Stream of per-relay publish outcomes.
pub type StatusStream = mpsc::Receiver<RelayStatus>;

/// Stream of events matching a subscription.
pub type EventStream = mpsc::Receiver<InboundEvent>;

/// The EventBus trait: the signed-event transport seen from this crate.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Streams
///
/// - `publish` yields one [`RelayStatus`] per relay, in arrival order, with
///   no guaranteed count or ordering across relays.
/// - `subscribe` yields matching events, possibly duplicated across relays.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Get the transport name (e.g., "spool", "mock").
    fn name(&self) -> &'static str;

    /// Publish an event to every relay.
    ///
    /// # Errors
    ///
    /// - `NoIdentity` if the transport cannot author the event
    /// - `NoRelays` if there is nowhere to publish
    async fn publish(&self, event: UnsignedEvent) -> Result<StatusStream, BusError>;

    /// Subscribe to events matching `filter` on every relay.
    async fn subscribe(&self, filter: Filter) -> Result<EventStream, BusError>;
}
