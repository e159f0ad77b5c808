//! core
//!
//! Core domain types, rules, and configuration for gitnostr.
//!
//! # Modules
//!
//! - [`types`] - Strong types: IdentityKey, EventKind, Locator
//! - [`validate`] - Repository name rules and the corrupted-event check
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - All validation is deterministic

pub mod config;
pub mod types;
pub mod validate;
