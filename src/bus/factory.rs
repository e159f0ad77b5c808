//! bus::factory
//!
//! Bus selection and creation.
//!
//! Commands use [`create_bus`] rather than constructing a transport
//! directly. The relay URL scheme selects the transport.
//!
//! # Example
//!
//! ```ignore
//! use gitnostr::bus::create_bus;
//!
//! let bus = create_bus(config.relays(), config.identity())?;
//! let statuses = bus.publish(draft).await?;
//! ```

use super::spool::{SpoolBus, SpoolRelay};
use super::traits::{BusError, EventBus};
use crate::core::types::IdentityKey;

/// Create a bus over the given relay URLs.
///
/// # Errors
///
/// - `NoRelays` if `relays` is empty
/// - `UnsupportedRelay` if any relay uses an unknown scheme
pub fn create_bus(
    relays: &[String],
    author: Option<IdentityKey>,
) -> Result<Box<dyn EventBus>, BusError> {
    if relays.is_empty() {
        return Err(BusError::NoRelays);
    }

    let spool_relays = relays
        .iter()
        .map(|url| SpoolRelay::parse(url))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(relays = spool_relays.len(), "created spool bus");
    Ok(Box::new(SpoolBus::new(spool_relays, author)))
}
