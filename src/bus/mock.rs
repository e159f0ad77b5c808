//! bus::mock
//!
//! Mock event bus for deterministic testing.
//!
//! # Design
//!
//! The mock replays a script: publish statuses and subscription events, each
//! after a delay measured from the call. Once the script runs out the stream
//! stays open (like a real relay pool) until the receiver is dropped, unless
//! [`MockBus::close_when_done`] is set. Tests drive deadlines with tokio's
//! paused clock.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gitnostr::bus::mock::MockBus;
//! use gitnostr::bus::{EventBus, PublishStatus, RelayStatus};
//! use gitnostr::core::types::EventKind;
//! use gitnostr::protocol::UnsignedEvent;
//!
//! # tokio_test::block_on(async {
//! let bus = MockBus::new()
//!     .with_status(RelayStatus::new("relay-a", PublishStatus::Succeeded), Duration::ZERO)
//!     .close_when_done();
//!
//! let mut statuses = bus
//!     .publish(UnsignedEvent::now(EventKind::TaggedRepository, vec![], String::new()))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(statuses.recv().await.unwrap().status, PublishStatus::Succeeded);
//! assert!(statuses.recv().await.is_none());
//! assert_eq!(bus.published().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

use super::traits::{
    BusError, EventBus, EventStream, Filter, RelayStatus, StatusStream, CHANNEL_CAPACITY,
};
use crate::protocol::{InboundEvent, UnsignedEvent};

/// Mock bus for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    inner: Arc<Mutex<MockBusInner>>,
}

#[derive(Debug, Default)]
struct MockBusInner {
    statuses: Vec<(Duration, RelayStatus)>,
    events: Vec<(Duration, InboundEvent)>,
    close_when_done: bool,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail publish with the given error.
    Publish(BusError),
    /// Fail subscribe with the given error.
    Subscribe(BusError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    Publish { event: UnsignedEvent },
    Subscribe { filter: Filter },
}

impl MockBus {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a publish status, emitted `delay` after each publish call.
    pub fn with_status(self, status: RelayStatus, delay: Duration) -> Self {
        self.lock().statuses.push((delay, status));
        self
    }

    /// Script a subscription event, emitted `delay` after each subscribe call.
    ///
    /// The subscription filter is applied, as a relay would.
    pub fn with_event(self, event: InboundEvent, delay: Duration) -> Self {
        self.lock().events.push((delay, event));
        self
    }

    /// Close streams once the script is exhausted.
    pub fn close_when_done(self) -> Self {
        self.lock().close_when_done = true;
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Events handed to `publish`, in call order.
    pub fn published(&self) -> Vec<UnsignedEvent> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Publish { event } => Some(event.clone()),
                MockOperation::Subscribe { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockBusInner> {
        // A poisoned lock only happens after a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Emit scripted items in delay order, then optionally hold the stream open.
fn replay<T: Send + 'static>(
    mut script: Vec<(Duration, T)>,
    close_when_done: bool,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    script.sort_by_key(|(delay, _)| *delay);

    tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for (delay, item) in script {
            tokio::time::sleep_until(start + delay).await;
            if tx.send(item).await.is_err() {
                return;
            }
        }
        if !close_when_done {
            tx.closed().await;
        }
    });

    rx
}

#[async_trait]
impl EventBus for MockBus {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn publish(&self, event: UnsignedEvent) -> Result<StatusStream, BusError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Publish { event });

        if let Some(FailOn::Publish(e)) = &inner.fail_on {
            return Err(e.clone());
        }

        Ok(replay(inner.statuses.clone(), inner.close_when_done))
    }

    async fn subscribe(&self, filter: Filter) -> Result<EventStream, BusError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Subscribe {
            filter: filter.clone(),
        });

        if let Some(FailOn::Subscribe(e)) = &inner.fail_on {
            return Err(e.clone());
        }

        let script = inner
            .events
            .iter()
            .filter(|(_, event)| filter.matches_event(event))
            .cloned()
            .collect();

        Ok(replay(script, inner.close_when_done))
    }
}
