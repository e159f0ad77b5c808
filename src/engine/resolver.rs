//! engine::resolver
//!
//! Resolving `owner:repository` to the announcement that should be cloned.
//!
//! # Fold
//!
//! 1. Resolve the owner alias to an identity key (failure aborts the call)
//! 2. Subscribe to that identity's repository announcements, both formats
//! 3. Until the deadline, decode each event and keep the best match
//! 4. At the deadline, return the best match or `RepositoryNotFound`
//!
//! Undecodable, corrupted, or non-matching events are skipped; they never
//! abort the fold.
//!
//! # Tie-break
//!
//! [`TieBreak::LastObserved`] (the default) keeps whichever matching event
//! arrived last, ignoring creation time. This mirrors deployed clients and
//! depends on arrival order. [`TieBreak::Newest`] applies replaceable-event
//! ordering instead: greatest `created_at`, then smallest event id.

use std::time::Duration;
use tokio::time::Instant;

use super::{deadline_from_now, EngineError};
use crate::bus::{EventBus, EventStream, Filter};
use crate::core::types::{IdentityKey, Locator, TieBreak};
use crate::core::validate::is_corrupted_repository_event;
use crate::identity::IdentityResolver;
use crate::protocol::{decode_repository, InboundEvent, RepositoryFact};

/// The announcement chosen for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepository {
    pub fact: RepositoryFact,
    pub publisher: IdentityKey,
    pub event_id: String,
    pub created_at: i64,
}

/// Running best candidate for one resolution call.
#[derive(Debug)]
struct Selection {
    tie_break: TieBreak,
    best: Option<ResolvedRepository>,
}

impl Selection {
    fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            best: None,
        }
    }

    fn offer(&mut self, candidate: ResolvedRepository) {
        let replace = match (&self.best, self.tie_break) {
            (None, _) => true,
            (Some(_), TieBreak::LastObserved) => true,
            (Some(current), TieBreak::Newest) => {
                candidate.created_at > current.created_at
                    || (candidate.created_at == current.created_at
                        && candidate.event_id < current.event_id)
            }
        };
        if replace {
            self.best = Some(candidate);
        }
    }

    fn finish(self) -> Option<ResolvedRepository> {
        self.best
    }
}

/// Turn one inbound event into a candidate for `name`, if it is one.
fn candidate(event: InboundEvent, owner: &IdentityKey, name: &str) -> Option<ResolvedRepository> {
    let fact = match decode_repository(&event) {
        Ok(fact) => fact,
        Err(e) => {
            tracing::info!(event_id = %event.id, kind = %event.kind, error = %e, "failed to parse repository");
            return None;
        }
    };

    if fact.name != name {
        tracing::trace!(event_id = %event.id, found = %fact.name, "different repository");
        return None;
    }

    if is_corrupted_repository_event(&event.id, &fact.name, &event.publisher) {
        tracing::warn!(event_id = %event.id, "discarding corrupted repository event");
        return None;
    }

    let publisher = IdentityKey::new(event.publisher.as_str()).ok()?;
    if &publisher != owner {
        tracing::warn!(event_id = %event.id, publisher = %publisher, "discarding event from unexpected author");
        return None;
    }

    Some(ResolvedRepository {
        fact,
        publisher,
        event_id: event.id,
        created_at: event.created_at,
    })
}

/// Drain `events` until `deadline`, keeping the best match for `name`.
async fn fold(
    mut events: EventStream,
    owner: &IdentityKey,
    name: &str,
    deadline: Instant,
    tie_break: TieBreak,
) -> Option<ResolvedRepository> {
    let timer = tokio::time::sleep_until(deadline);
    tokio::pin!(timer);

    let mut selection = Selection::new(tie_break);

    loop {
        tokio::select! {
            biased;
            _ = &mut timer => break,
            next = events.recv() => match next {
                Some(event) => {
                    if let Some(found) = candidate(event, owner, name) {
                        tracing::debug!(event_id = %found.event_id, "matching announcement");
                        selection.offer(found);
                    }
                }
                // Every relay has finished.
                None => break,
            },
        }
    }

    selection.finish()
}

/// Resolves repository locators against an event bus.
pub struct Resolver<'a> {
    bus: &'a dyn EventBus,
    identities: &'a dyn IdentityResolver,
    tie_break: TieBreak,
}

impl<'a> Resolver<'a> {
    pub fn new(bus: &'a dyn EventBus, identities: &'a dyn IdentityResolver) -> Self {
        Self {
            bus,
            identities,
            tie_break: TieBreak::default(),
        }
    }

    /// Use a different tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Resolve a parsed locator.
    pub async fn resolve_locator(
        &self,
        locator: &Locator,
        deadline: Duration,
    ) -> Result<ResolvedRepository, EngineError> {
        self.resolve(locator.identity_alias(), locator.repository_name(), deadline)
            .await
    }

    /// Resolve `owner_alias`'s repository `name`, waiting up to `deadline`.
    ///
    /// # Errors
    ///
    /// - `Identity` if the alias does not resolve (before any subscription)
    /// - `Bus` if the subscription cannot be opened
    /// - `RepositoryNotFound` if nothing matched by the deadline
    pub async fn resolve(
        &self,
        owner_alias: &str,
        name: &str,
        deadline: Duration,
    ) -> Result<ResolvedRepository, EngineError> {
        let owner = self.identities.resolve(owner_alias).await?;
        tracing::debug!(%owner, name, "resolving repository");
        let deadline = deadline_from_now(deadline);

        let events = self
            .bus
            .subscribe(Filter::repositories_by(owner.clone()))
            .await?;

        fold(events, &owner, name, deadline, self.tie_break)
            .await
            .ok_or_else(|| EngineError::RepositoryNotFound {
                owner,
                name: name.to_string(),
            })
    }
}
