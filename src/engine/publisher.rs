//! engine::publisher
//!
//! Publishing a fact and folding per-relay outcomes into one verdict.
//!
//! # Verdict
//!
//! The status stream is raced against the deadline:
//! - `Sent` or `Succeeded` from any relay counts as success (some transports
//!   never emit `Succeeded`)
//! - `Failed` is recorded but never clears an earlier success
//! - at the deadline, no success means [`EngineError::PublishUnconfirmed`]
//!
//! An unconfirmed publish is not a rejection. The event may still arrive
//! late, and facts are declarative, so retrying is always safe.

use std::time::Duration;
use super::{deadline_from_now, EngineError};
use crate::bus::{EventBus, PublishStatus, RelayStatus};
use crate::protocol::{
    encode_announcement, encode_grant, PermissionGrant, RepositoryFact, UnsignedEvent,
};

/// A fact that can be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Repository(RepositoryFact),
    Grant(PermissionGrant),
}

impl Fact {
    /// Encode for the wire. Repository facts always use the tagged format.
    pub fn encode(&self) -> Result<UnsignedEvent, EngineError> {
        let draft = match self {
            Fact::Repository(fact) => encode_announcement(fact)?,
            Fact::Grant(grant) => encode_grant(grant)?,
        };
        Ok(draft)
    }

    /// Short label for messages ("repository", "permission").
    pub fn label(&self) -> &'static str {
        match self {
            Fact::Repository(_) => "repository",
            Fact::Grant(_) => "permission",
        }
    }
}

/// Result of a confirmed publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Relays that reported `Sent` or `Succeeded`, first report order
    pub acknowledged: Vec<String>,
    /// Relays that reported `Failed`
    pub failed: Vec<String>,
}

impl PublishOutcome {
    fn record(&mut self, status: &RelayStatus) {
        let list = match status.status {
            PublishStatus::Sent | PublishStatus::Succeeded => &mut self.acknowledged,
            PublishStatus::Failed => &mut self.failed,
        };
        if !list.contains(&status.relay) {
            list.push(status.relay.clone());
        }
    }

    /// Whether any relay acknowledged.
    pub fn is_confirmed(&self) -> bool {
        !self.acknowledged.is_empty()
    }
}

/// Publish a fact and wait up to `deadline` for acknowledgements.
///
/// # Errors
///
/// - `InvalidName` before anything is sent
/// - `Bus` if the transport refuses the event outright
/// - `PublishUnconfirmed` if no relay acknowledged in time
pub async fn publish(
    bus: &dyn EventBus,
    fact: &Fact,
    deadline: Duration,
) -> Result<PublishOutcome, EngineError> {
    publish_with(bus, fact, deadline, |_| {}).await
}

/// Like [`publish`], calling `on_status` for every status as it arrives.
pub async fn publish_with<F>(
    bus: &dyn EventBus,
    fact: &Fact,
    deadline: Duration,
    mut on_status: F,
) -> Result<PublishOutcome, EngineError>
where
    F: FnMut(&RelayStatus),
{
    let draft = fact.encode()?;
    let deadline = deadline_from_now(deadline);

    let mut statuses = bus.publish(draft).await?;
    let timer = tokio::time::sleep_until(deadline);
    tokio::pin!(timer);

    let mut outcome = PublishOutcome::default();

    loop {
        tokio::select! {
            biased;
            _ = &mut timer => break,
            next = statuses.recv() => match next {
                Some(status) => {
                    tracing::debug!(relay = %status.relay, status = %status.status, "publish status");
                    outcome.record(&status);
                    on_status(&status);
                }
                // Every relay has answered.
                None => break,
            },
        }
    }

    if outcome.is_confirmed() {
        tracing::info!(
            kind = fact.label(),
            acknowledged = outcome.acknowledged.len(),
            failed = outcome.failed.len(),
            "publish confirmed"
        );
        Ok(outcome)
    } else {
        Err(EngineError::PublishUnconfirmed {
            failed: outcome.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mock::{FailOn, MockBus};
    use crate::bus::BusError;
    use crate::core::types::{EventKind, IdentityKey};

    fn repo(name: &str) -> Fact {
        Fact::Repository(RepositoryFact::new(name, Some("git@host".to_string())))
    }

    fn status(relay: &str, status: PublishStatus) -> RelayStatus {
        RelayStatus::new(relay, status)
    }

    #[test]
    fn outcome_dedupes_relays() {
        let mut outcome = PublishOutcome::default();
        outcome.record(&status("a", PublishStatus::Sent));
        outcome.record(&status("a", PublishStatus::Succeeded));
        outcome.record(&status("b", PublishStatus::Failed));

        assert_eq!(outcome.acknowledged, vec!["a".to_string()]);
        assert_eq!(outcome.failed, vec!["b".to_string()]);
        assert!(outcome.is_confirmed());
    }

    #[test]
    fn grant_encodes_as_permission_kind() {
        let fact = Fact::Grant(PermissionGrant {
            repository_name: "public".to_string(),
            target_identity: IdentityKey::new("aa".repeat(32)).unwrap(),
            permission: "READ".to_string(),
        });
        assert_eq!(fact.encode().unwrap().kind, EventKind::PermissionGrant);
        assert_eq!(fact.label(), "permission");
    }

    #[tokio::test(start_paused = true)]
    async fn huge_deadline_does_not_overflow() {
        let bus = MockBus::new()
            .with_status(
                status("file:///a", PublishStatus::Succeeded),
                Duration::from_millis(1),
            )
            .close_when_done();

        let outcome = publish(&bus, &repo("public"), Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(outcome.acknowledged, vec!["file:///a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_deadline_with_silent_bus_is_unconfirmed() {
        let bus = MockBus::new();

        let result = publish(&bus, &repo("public"), Duration::ZERO).await;

        assert!(matches!(
            result,
            Err(EngineError::PublishUnconfirmed { ref failed }) if failed.is_empty()
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn one_quick_success_is_enough() {
        let bus = MockBus::new().with_status(
            status("wss://fast", PublishStatus::Succeeded),
            Duration::from_millis(10),
        );

        let outcome = publish(&bus, &repo("public"), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(outcome.acknowledged, vec!["wss://fast".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn sent_counts_as_success() {
        let bus = MockBus::new()
            .with_status(status("a", PublishStatus::Sent), Duration::ZERO)
            .close_when_done();

        let outcome = publish(&bus, &repo("public"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome.acknowledged, vec!["a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn later_failure_does_not_clear_success() {
        let bus = MockBus::new()
            .with_status(status("a", PublishStatus::Succeeded), Duration::from_millis(1))
            .with_status(status("b", PublishStatus::Failed), Duration::from_millis(2))
            .close_when_done();

        let outcome = publish(&bus, &repo("public"), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(outcome.acknowledged, vec!["a".to_string()]);
        assert_eq!(outcome.failed, vec!["b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn only_failures_is_unconfirmed() {
        let bus = MockBus::new()
            .with_status(status("a", PublishStatus::Failed), Duration::from_millis(1))
            .with_status(status("b", PublishStatus::Failed), Duration::from_millis(1));

        let result = publish(&bus, &repo("public"), Duration::from_secs(1)).await;

        match result {
            Err(EngineError::PublishUnconfirmed { failed }) => {
                assert_eq!(failed, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected PublishUnconfirmed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn statuses_after_deadline_are_ignored() {
        let bus = MockBus::new().with_status(
            status("late", PublishStatus::Succeeded),
            Duration::from_secs(10),
        );

        let result = publish(&bus, &repo("public"), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(EngineError::PublishUnconfirmed { .. })));
    }

    #[tokio::test]
    async fn invalid_name_never_reaches_bus() {
        let bus = MockBus::new();

        let result = publish(&bus, &repo("bad name"), Duration::from_secs(1)).await;

        assert!(matches!(result, Err(EngineError::InvalidName(_))));
        assert!(bus.operations().is_empty());
    }

    #[tokio::test]
    async fn bus_refusal_is_surfaced() {
        let bus = MockBus::new().fail_on(FailOn::Publish(BusError::NoIdentity));

        let result = publish(&bus, &repo("public"), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(EngineError::Bus(BusError::NoIdentity))));
    }

    #[tokio::test(start_paused = true)]
    async fn observer_sees_every_status() {
        let bus = MockBus::new()
            .with_status(status("a", PublishStatus::Sent), Duration::ZERO)
            .with_status(status("a", PublishStatus::Succeeded), Duration::from_millis(5))
            .close_when_done();

        let mut seen = Vec::new();
        publish_with(&bus, &repo("public"), Duration::from_secs(1), |s| {
            seen.push(s.status)
        })
        .await
        .unwrap();

        assert_eq!(seen, vec![PublishStatus::Sent, PublishStatus::Succeeded]);
    }

    #[tokio::test]
    async fn publishes_tagged_announcement() {
        let bus = MockBus::new()
            .with_status(status("a", PublishStatus::Succeeded), Duration::ZERO)
            .close_when_done();

        publish(&bus, &repo("public"), Duration::from_secs(1))
            .await
            .unwrap();

        let published = bus.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].kind, EventKind::TaggedRepository);
        assert!(published[0].content.is_empty());
    }
}
