//! gitnostr - Publish and resolve git repositories over relay networks
//!
//! Repositories are announced as events on a set of relays. Anyone can
//! resolve `owner:repository` by asking those relays for the owner's
//! announcements and turning the chosen one into a clone URL.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Publishing facts and resolving repositories
//! - [`protocol`] - Event model and the repository/permission codecs
//! - [`bus`] - Relay transport abstraction (spool directories, mock)
//! - [`identity`] - Alias to identity key resolution (hex, NIP-05)
//! - [`core`] - Domain types, name rules, and configuration
//! - [`ui`] - Output formatting
//!
//! # Event Formats
//!
//! Two repository formats are read: the legacy kind 51 with a JSON body and
//! the tagged kind 30617 keyed by its `d` tag. Only the tagged format is
//! written. Permission grants use kind 50.

pub mod bus;
pub mod cli;
pub mod core;
pub mod engine;
pub mod identity;
pub mod protocol;
pub mod ui;
