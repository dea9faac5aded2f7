//! Checkout operations for git repositories
//!
//! This module handles:
//! - Checking out specific commits (detached)
//! - Reading HEAD and files at HEAD

use std::path::Path;

use git2::{Oid, Repository};

use super::error::interpret_git_error;
use crate::error::{self, Result};

/// Checkout a specific commit in the repository, detaching HEAD
pub fn checkout_commit(repo: &Repository, sha: &str) -> Result<()> {
    let fail = |e: git2::Error| error::git_operation_failed("checkout", sha, interpret_git_error(&e));

    let oid = Oid::from_str(sha).map_err(fail)?;
    let commit = repo.find_commit(oid).map_err(fail)?;
    repo.set_head_detached(commit.id()).map_err(fail)?;

    let mut checkout_builder = git2::build::CheckoutBuilder::new();
    checkout_builder.force();
    repo.checkout_head(Some(&mut checkout_builder)).map_err(fail)?;

    Ok(())
}

/// Open an existing repository
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| {
        error::git_operation_failed("open", path.display().to_string(), e.message())
    })
}

/// Commit HEAD points at
pub fn head_commit(repo: &Repository, path: &Path) -> Result<String> {
    let commit = repo
        .head()
        .and_then(|head| head.peel_to_commit())
        .map_err(|e| {
            error::git_operation_failed("rev-parse HEAD", path.display().to_string(), e.message())
        })?;
    Ok(commit.id().to_string())
}

/// Contents of `file` in the HEAD tree, `None` when it is not tracked there
pub fn read_at_head(repo: &Repository, path: &Path, file: &str) -> Result<Option<String>> {
    let target = path.display().to_string();
    let tree = repo
        .head()
        .and_then(|head| head.peel_to_tree())
        .map_err(|e| error::git_operation_failed("read HEAD tree", &target, e.message()))?;

    let Ok(entry) = tree.get_path(Path::new(file)) else {
        return Ok(None);
    };
    let blob = entry
        .to_object(repo)
        .and_then(|obj| obj.peel_to_blob())
        .map_err(|e| error::git_operation_failed("read blob", &target, e.message()))?;

    Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
}
