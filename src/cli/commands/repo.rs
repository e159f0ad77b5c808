//! repo command - Announce, grant, resolve, and clone repositories

use crate::bus::{create_bus, EventBus};
use crate::core::types::Locator;
use crate::core::validate::is_valid_repository_name;
use crate::engine::{
    clone_locator, publisher, CloneTarget, Context, EngineError, Fact, GitCloneRunner, Resolver,
};
use crate::identity::{IdentityResolver, Nip05Resolver};
use crate::protocol::{PermissionGrant, RepositoryFact};
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};
use std::sync::Arc;

/// Announce a repository under the configured identity.
pub fn create(ctx: &Context, name: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(create_impl(ctx, name))
}

/// Grant `target` a permission on one of our repositories.
pub fn permission(ctx: &Context, name: &str, target: &str, permission: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(permission_impl(ctx, name, target, permission))
}

/// Print the clone URL for a locator.
pub fn resolve(ctx: &Context, locator: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(resolve_impl(ctx, locator))
}

/// Resolve a locator and run `git clone`.
pub fn clone(ctx: &Context, locator: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(clone_impl(ctx, locator))
}

async fn create_impl(ctx: &Context, name: &str) -> Result<()> {
    ensure_valid_name(name)?;

    let fact = RepositoryFact::new(name, ctx.config.git_ssh_base().map(str::to_string));
    publish_fact(ctx, &Fact::Repository(fact)).await
}

async fn permission_impl(ctx: &Context, name: &str, target: &str, permission: &str) -> Result<()> {
    ensure_valid_name(name)?;

    let target_identity = Nip05Resolver::new()
        .resolve(target)
        .await
        .with_context(|| format!("Failed to resolve target identity '{}'", target))?;

    let grant = PermissionGrant {
        repository_name: name.to_string(),
        target_identity,
        permission: permission.to_string(),
    };
    publish_fact(ctx, &Fact::Grant(grant)).await
}

async fn resolve_impl(ctx: &Context, locator: &str) -> Result<()> {
    let locator = Locator::parse(locator).context("Invalid locator")?;
    let bus = open_bus(ctx)?;
    let identities = Nip05Resolver::new();

    let resolved = Resolver::new(&*bus, &identities)
        .with_tie_break(ctx.config.tie_break())
        .resolve_locator(&locator, ctx.config.resolve_timeout())
        .await?;

    let target = CloneTarget::from_resolved(&resolved, ctx.config.git_ssh_base())?;
    println!("{}", target.url());
    Ok(())
}

async fn clone_impl(ctx: &Context, locator: &str) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let locator = Locator::parse(locator).context("Invalid locator")?;
    let bus = open_bus(ctx)?;
    let identities = Nip05Resolver::new();
    let resolver = Resolver::new(&*bus, &identities).with_tie_break(ctx.config.tie_break());
    let runner = Arc::new(GitCloneRunner::new(ctx.cwd.clone()));

    let target = clone_locator(
        &resolver,
        &locator,
        ctx.config.resolve_timeout(),
        ctx.config.git_ssh_base(),
        runner,
    )
    .await?;

    output::print(format!("Cloned {}", target.url()), verbosity);
    Ok(())
}

/// Publish a fact, printing one line per relay answer.
async fn publish_fact(ctx: &Context, fact: &Fact) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let bus = open_bus(ctx)?;

    let result = publisher::publish_with(&*bus, fact, ctx.config.publish_timeout(), |status| {
        output::print(output::format_relay_status(fact.label(), status), verbosity);
    })
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(EngineError::PublishUnconfirmed { failed }) => {
            anyhow::bail!(
                "{} could not be confirmed by any relay before the deadline ({} failed). \
                 It may still arrive; publishing again is safe.",
                fact.label(),
                failed.len()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn open_bus(ctx: &Context) -> Result<Box<dyn EventBus>> {
    create_bus(ctx.config.relays(), ctx.config.identity())
        .context("Failed to open relays (set them with --relay or 'git-nostr config set relays')")
}

fn ensure_valid_name(name: &str) -> Result<()> {
    if !is_valid_repository_name(name) {
        return Err(EngineError::InvalidName(name.to_string()).into());
    }
    Ok(())
}
