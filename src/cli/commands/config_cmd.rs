//! config command - Get, set, or list configuration values

use crate::core::config::{Config, FileConfig, ResolveConfig, TimeoutsConfig};
use crate::engine::Context;
use anyhow::{bail, Context as _, Result};
use std::path::PathBuf;

/// Keys understood by `get`, `set`, and `list`, in display order.
const KEYS: &[&str] = &[
    "relays",
    "identity",
    "git_ssh_base",
    "timeouts.publish_secs",
    "timeouts.resolve_secs",
    "resolve.tie_break",
];

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    if let Some(value) = lookup(&ctx.config.file, key)? {
        println!("{}", value);
    }
    // Key exists but has no value - exit silently
    Ok(())
}

/// Set a configuration value.
///
/// Writes back to the file the config was loaded from, or to the canonical
/// location if none was found. Flag overrides are not persisted.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = target_path(ctx)?;

    let mut file = if path.exists() {
        Config::load(Some(&path))
            .context("Failed to load config")?
            .file
    } else {
        FileConfig::default()
    };

    assign(&mut file, key, value)?;
    Config::write(&path, &file).context("Failed to write config")?;

    if !ctx.quiet {
        println!("Set {} = {}", key, value);
    }

    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => println!("# Configuration ({})", path.display()),
        None => println!("# Configuration (defaults)"),
    }

    for key in KEYS {
        let value = lookup(&ctx.config.file, key)?.unwrap_or_else(|| "(not set)".to_string());
        println!("{} = {}", key, value);
    }

    Ok(())
}

fn target_path(ctx: &Context) -> Result<PathBuf> {
    match ctx.config.loaded_from() {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path().context("Failed to locate config file"),
    }
}

/// Read one key from the file contents.
fn lookup(file: &FileConfig, key: &str) -> Result<Option<String>> {
    let timeouts = file.timeouts.as_ref();
    let value = match key {
        "relays" => file.relays.as_ref().map(|r| r.join(",")),
        "identity" => file.identity.clone(),
        "git_ssh_base" => file.git_ssh_base.clone(),
        "timeouts.publish_secs" => timeouts.and_then(|t| t.publish_secs).map(|s| s.to_string()),
        "timeouts.resolve_secs" => timeouts.and_then(|t| t.resolve_secs).map(|s| s.to_string()),
        "resolve.tie_break" => file.resolve.as_ref().and_then(|r| r.tie_break.clone()),
        _ => bail!("Unknown configuration key: {}", key),
    };
    Ok(value)
}

/// Write one key into the file contents. Validation happens on write.
fn assign(file: &mut FileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "relays" => {
            let relays: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
            file.relays = Some(relays);
        }
        "identity" => file.identity = Some(value.to_string()),
        "git_ssh_base" => file.git_ssh_base = Some(value.to_string()),
        "timeouts.publish_secs" => {
            let secs = parse_secs(key, value)?;
            file.timeouts
                .get_or_insert_with(TimeoutsConfig::default)
                .publish_secs = Some(secs);
        }
        "timeouts.resolve_secs" => {
            let secs = parse_secs(key, value)?;
            file.timeouts
                .get_or_insert_with(TimeoutsConfig::default)
                .resolve_secs = Some(secs);
        }
        "resolve.tie_break" => {
            file.resolve
                .get_or_insert_with(ResolveConfig::default)
                .tie_break = Some(value.to_string());
        }
        _ => bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_then_lookup() {
        let mut file = FileConfig::default();
        assign(&mut file, "relays", "file:///a, file:///b").unwrap();
        assign(&mut file, "timeouts.resolve_secs", "3").unwrap();
        assign(&mut file, "resolve.tie_break", "newest").unwrap();

        assert_eq!(
            lookup(&file, "relays").unwrap().as_deref(),
            Some("file:///a,file:///b")
        );
        assert_eq!(
            lookup(&file, "timeouts.resolve_secs").unwrap().as_deref(),
            Some("3")
        );
        assert_eq!(lookup(&file, "timeouts.publish_secs").unwrap(), None);
        assert_eq!(
            lookup(&file, "resolve.tie_break").unwrap().as_deref(),
            Some("newest")
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let mut file = FileConfig::default();
        assert!(lookup(&file, "trunk").is_err());
        assert!(assign(&mut file, "trunk", "main").is_err());
    }

    #[test]
    fn non_numeric_timeout_rejected() {
        let mut file = FileConfig::default();
        assert!(assign(&mut file, "timeouts.publish_secs", "soon").is_err());
    }

    #[test]
    fn every_listed_key_is_readable() {
        let file = FileConfig::default();
        for key in KEYS {
            assert!(lookup(&file, key).is_ok(), "{}", key);
        }
    }
}
