//! engine::clone
//!
//! Turning a resolved announcement into a clone and running it.
//!
//! The clone URL is `<cloneBase>:<publisherHex>/<repositoryName>`. The base
//! comes from the announcement, falling back to the configured default.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::resolver::{ResolvedRepository, Resolver};
use super::EngineError;
use crate::core::types::{IdentityKey, Locator};

/// Errors from cloning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloneError {
    /// Neither the announcement nor the configuration names a clone base.
    #[error("no clone base announced or configured for '{0}'")]
    NoCloneBase(String),

    /// The clone process could not run or exited unsuccessfully.
    #[error("git clone failed: {0}")]
    Failed(String),
}

/// Everything needed to clone one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTarget {
    pub clone_base: String,
    pub publisher: IdentityKey,
    pub repository_name: String,
}

impl CloneTarget {
    /// Build a target from a resolution, falling back to `default_base`.
    pub fn from_resolved(
        resolved: &ResolvedRepository,
        default_base: Option<&str>,
    ) -> Result<Self, CloneError> {
        let clone_base = resolved
            .fact
            .clone_base
            .as_deref()
            .or(default_base)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| CloneError::NoCloneBase(resolved.fact.name.clone()))?;

        Ok(Self {
            clone_base: clone_base.to_string(),
            publisher: resolved.publisher.clone(),
            repository_name: resolved.fact.name.clone(),
        })
    }

    /// The URL handed to git.
    pub fn url(&self) -> String {
        format!(
            "{}:{}/{}",
            self.clone_base, self.publisher, self.repository_name
        )
    }
}

/// Executes a clone. The only side effect in the resolution path.
///
/// `run_clone` may block for as long as the clone takes; [`clone_locator`]
/// calls it on the blocking pool.
pub trait CloneRunner: Send + Sync {
    fn run_clone(&self, target: &CloneTarget) -> Result<(), CloneError>;
}

/// Runs `git clone <url>` with inherited stdio.
#[derive(Debug, Clone, Default)]
pub struct GitCloneRunner {
    cwd: Option<PathBuf>,
}

impl GitCloneRunner {
    pub fn new(cwd: Option<PathBuf>) -> Self {
        Self { cwd }
    }
}

impl CloneRunner for GitCloneRunner {
    fn run_clone(&self, target: &CloneTarget) -> Result<(), CloneError> {
        let url = target.url();
        tracing::info!(%url, "git clone");

        let mut cmd = Command::new("git");
        cmd.arg("clone").arg(&url);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        let status = cmd
            .status()
            .map_err(|e| CloneError::Failed(format!("failed to run git: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(CloneError::Failed(format!("git exited with {}", status)))
        }
    }
}

/// Resolve `locator` and clone the winning announcement.
pub async fn clone_locator(
    resolver: &Resolver<'_>,
    locator: &Locator,
    deadline: Duration,
    default_base: Option<&str>,
    runner: Arc<dyn CloneRunner>,
) -> Result<CloneTarget, EngineError> {
    let resolved = resolver.resolve_locator(locator, deadline).await?;
    let target = CloneTarget::from_resolved(&resolved, default_base)?;

    let job = target.clone();
    tokio::task::spawn_blocking(move || runner.run_clone(&job))
        .await
        .map_err(|e| CloneError::Failed(format!("clone task did not finish: {}", e)))??;

    Ok(target)
}
