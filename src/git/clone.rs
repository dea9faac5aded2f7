//! Cloning and fetching under a transfer deadline
//!
//! libgit2 has no wall-clock timeout, so the transfer-progress callback
//! aborts the transfer once the deadline has passed.

use std::path::Path;
use std::time::{Duration, Instant};

use git2::{AutotagOption, FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use super::error::{interpret_git_error, is_user_abort};
use crate::error::{self, GraftError, Result};

/// Refspecs fetched into an existing checkout
const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

fn fetch_options(deadline: Instant) -> FetchOptions<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |_| Instant::now() < deadline);
    callbacks.sideband_progress(move |_| Instant::now() < deadline);

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options.download_tags(AutotagOption::All);
    options
}

fn transfer_error(operation: &str, url: &str, err: &git2::Error, limit: Duration) -> GraftError {
    if is_user_abort(err) {
        error::git_timeout(operation, url, limit)
    } else {
        error::git_operation_failed(operation, url, interpret_git_error(err))
    }
}

/// Clone a repository (full history, so any ref can be checked out)
pub fn clone(url: &str, target: &Path, limit: Duration) -> Result<Repository> {
    let deadline = Instant::now() + limit;
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(deadline));

    tracing::debug!(url, target = %target.display(), "cloning");
    builder
        .clone(url, target)
        .map_err(|e| transfer_error("clone", url, &e, limit))
}

/// Fetch all branches and tags from origin
pub fn fetch(repo: &Repository, url: &str, limit: Duration) -> Result<()> {
    let deadline = Instant::now() + limit;
    let mut remote = repo
        .find_remote("origin")
        .map_err(|e| error::git_operation_failed("fetch", url, e.message()))?;

    tracing::debug!(url, "fetching");
    remote
        .fetch(&FETCH_REFSPECS, Some(&mut fetch_options(deadline)), None)
        .map_err(|e| transfer_error("fetch", url, &e, limit))
}

/// URL of the checkout's origin remote, if it has one
pub fn origin_url(repo: &Repository) -> Option<String> {
    repo.find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string))
}
