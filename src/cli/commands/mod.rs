//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Repository commands talk to relays and identity servers, so they are
//! async. Each one builds a tokio runtime and blocks on its implementation.

mod completion;
mod config_cmd;
mod repo;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use repo::{clone, create, permission, resolve};

use crate::cli::args::{Command, ConfigAction, RepoAction};
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Repo { action } => match action {
            RepoAction::Create { name } => repo::create(ctx, &name),
            RepoAction::Permission {
                name,
                target,
                permission,
            } => repo::permission(ctx, &name, &target, &permission),
            RepoAction::Resolve { locator } => repo::resolve(ctx, &locator),
            RepoAction::Clone { locator } => repo::clone(ctx, &locator),
        },
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
