//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--relay <url>`: Override configured relays (repeatable)
//! - `--timeout <secs>`: Override the publish/resolve deadline
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// git-nostr - Publish and clone git repositories over relays
#[derive(Parser, Debug)]
#[command(name = "git-nostr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if git-nostr was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Relay URL to use instead of the configured relays
    #[arg(long = "relay", global = true, value_name = "URL")]
    pub relays: Vec<String>,

    /// Deadline in seconds for publish and resolve
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Announce, grant access to, resolve, and clone repositories
    #[command(
        name = "repo",
        after_help = "\
WORKFLOW EXAMPLES:
    # Announce a repository under your identity
    git-nostr repo create my-project

    # Let someone push to it
    git-nostr repo permission my-project bob@example.com WRITE

    # Find where someone's repository lives
    git-nostr repo resolve alice@example.com:my-project

    # Clone it
    git-nostr repo clone alice@example.com:my-project"
    )]
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
KEYS:
    relays          comma-separated relay URLs
    identity        hex identity key stamped on published events
    git_ssh_base    default clone base (e.g. git@gitnostr.example)
    timeouts.publish_secs
    timeouts.resolve_secs
    resolve.tie_break   last-observed | newest"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    git-nostr completion bash >> ~/.bashrc

    # Zsh
    git-nostr completion zsh > ~/.zfunc/_git-nostr"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Repository subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RepoAction {
    /// Announce a repository
    Create {
        /// Repository name (no spaces, '/' or '.')
        name: String,
    },
    /// Grant an identity a permission on a repository
    Permission {
        /// Repository name
        name: String,
        /// Target identity (hex key or name@domain)
        target: String,
        /// Permission label, passed through verbatim
        permission: String,
    },
    /// Print the clone URL for owner:repository
    Resolve {
        /// Locator, e.g. alice@example.com:my-project
        locator: String,
    },
    /// Clone owner:repository
    Clone {
        /// Locator, e.g. alice@example.com:my-project
        locator: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
