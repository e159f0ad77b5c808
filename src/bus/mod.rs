//! bus
//!
//! Abstraction over the relay-based event transport.
//!
//! # Architecture
//!
//! The `EventBus` trait is an injected capability, never a global. The
//! publisher and resolver take `&dyn EventBus`, so tests supply a
//! deterministic [`mock::MockBus`] and the CLI builds a transport with
//! [`create_bus`].
//!
//! # Modules
//!
//! - `traits`: Core `EventBus` trait, filters, and publish statuses
//! - [`mock`]: Scripted implementation for deterministic testing
//! - [`spool`]: Directory-backed relays (`file://` URLs)
//! - `factory`: Transport selection from relay URLs

mod factory;
pub mod mock;
pub mod spool;
mod traits;

pub use factory::create_bus;
pub use traits::*;
