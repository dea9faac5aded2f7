//! URL normalization for git operations
//!
//! This module handles:
//! - Normalizing SSH URLs from SCP-style to ssh:// format
//! - Normalizing file:// URLs for libgit2 compatibility
//! - Comparing an existing checkout's origin with a requested source

use std::borrow::Cow;

/// Normalize SSH URLs from SCP-style (git@host:path) to ssh:// format.
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    let Some((host_part, path_part)) = url.split_once(':') else {
        return Cow::Borrowed(url);
    };
    let path = path_part.strip_prefix('/').unwrap_or(path_part);
    Cow::Owned(format!("ssh://{host_part}/{path}"))
}

/// Normalize file:// URLs so libgit2 can resolve them on Unix.
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        let path = after.replace('\\', "/");
        let path = path.trim_start_matches('/');
        return Cow::Owned(format!("file:///{path}"));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// URL as handed to libgit2 and the git CLI
pub fn normalize(url: &str) -> String {
    let url = normalize_ssh_url(url);
    normalize_file_url(&url).into_owned()
}

/// Whether two URLs point at the same repository
pub fn same_source(a: &str, b: &str) -> bool {
    let trim = |u: &str| {
        let normalized = normalize(u);
        normalized
            .trim_end_matches('/')
            .trim_end_matches(".git")
            .to_string()
    };
    trim(a) == trim(b)
}
