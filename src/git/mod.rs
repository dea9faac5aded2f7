//! Git operations for dependency checkouts
//!
//! This module handles:
//! - Cloning and fetching dependency repositories
//! - Resolving refs (branches, tags, commits) to exact SHAs
//! - Detached checkouts and reading files at HEAD
//! - Remote ref queries via `git ls-remote`
//!
//! Everything above this module talks to git through [`GitOps`];
//! [`SystemGit`] is the production implementation.

pub mod checkout;
pub mod clone;
pub mod error;
pub mod refs;
pub mod url;

use std::fs;
use std::path::Path;

use git2::Repository;

use crate::config::Timeouts;
use crate::error::{self as errors, Result};

/// Git capability consumed by the resolver, orchestrator and validator
pub trait GitOps {
    /// Make `dest` a checkout of `url` detached at `git_ref`
    fn clone_or_fetch(&self, url: &str, git_ref: &str, dest: &Path) -> Result<()>;

    /// Whether anything is checked out at `dest`
    fn has_checkout(&self, dest: &Path) -> bool;

    /// Commit the checkout at `dest` currently has checked out
    fn commit_of(&self, dest: &Path) -> Result<String>;

    /// Contents of `path` at the checkout's HEAD, `None` when absent
    fn read_file_at(&self, dest: &Path, path: &str) -> Result<Option<String>>;

    /// Commit `git_ref` names on the remote, `None` when the ref is absent
    fn ls_remote(&self, url: &str, git_ref: &str) -> Result<Option<String>>;
}

/// git2 for checkouts, the git CLI for remote queries
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit {
    timeouts: Timeouts,
}

impl SystemGit {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    /// Open `dest` if it is a checkout of `url`; discard it otherwise
    fn reuse_checkout(dest: &Path, url: &str) -> Result<Option<Repository>> {
        if !dest.exists() {
            return Ok(None);
        }
        if let Ok(repo) = Repository::open(dest) {
            if clone::origin_url(&repo).is_some_and(|origin| url::same_source(&origin, url)) {
                return Ok(Some(repo));
            }
        }

        tracing::info!(dest = %dest.display(), url, "replacing checkout with a different source");
        fs::remove_dir_all(dest).map_err(|e| errors::file_write_failed(dest, e))?;
        Ok(None)
    }
}

impl GitOps for SystemGit {
    fn clone_or_fetch(&self, source: &str, git_ref: &str, dest: &Path) -> Result<()> {
        let url = url::normalize(source);

        let repo = match Self::reuse_checkout(dest, &url)? {
            Some(repo) => {
                clone::fetch(&repo, &url, self.timeouts.git_fetch)?;
                repo
            }
            None => {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).map_err(|e| errors::file_write_failed(parent, e))?;
                }
                clone::clone(&url, dest, self.timeouts.git_fetch)?
            }
        };

        let commit = refs::resolve_reference(&repo, git_ref)
            .map_err(|_| {
                errors::git_operation_failed(
                    "resolve",
                    format!("{source}#{git_ref}"),
                    "ref not found in repository",
                )
            })?
            .id()
            .to_string();
        checkout::checkout_commit(&repo, &commit)?;

        tracing::debug!(source, git_ref, commit = %commit, "checked out");
        Ok(())
    }

    fn has_checkout(&self, dest: &Path) -> bool {
        dest.exists()
    }

    fn commit_of(&self, dest: &Path) -> Result<String> {
        let repo = checkout::open(dest)?;
        checkout::head_commit(&repo, dest)
    }

    fn read_file_at(&self, dest: &Path, path: &str) -> Result<Option<String>> {
        let repo = checkout::open(dest)?;
        checkout::read_at_head(&repo, dest, path)
    }

    fn ls_remote(&self, source: &str, git_ref: &str) -> Result<Option<String>> {
        refs::ls_remote(&url::normalize(source), git_ref, self.timeouts.git_query)
    }
}

#[cfg(test)]
mod tests;
