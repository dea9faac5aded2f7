//! Git reference resolution
//!
//! This module handles:
//! - Resolving refs (branches, tags, commits) inside a fetched checkout
//! - Querying a remote with `git ls-remote` under a deadline

use std::process::Command;
use std::time::Duration;

use git2::{Commit, Oid, Repository};

use crate::error::{self, Result};
use crate::exec::process;

/// Resolve a ref to a commit, preferring what was just fetched
///
/// Local branches in a checkout are stale after a fetch, so remote-tracking
/// branches win over them.
pub fn resolve_reference<'a>(repo: &'a Repository, refname: &str) -> Result<Commit<'a>> {
    let candidates = [
        format!("refs/remotes/origin/{refname}"),
        format!("refs/tags/{refname}"),
        refname.to_string(),
    ];

    for candidate in &candidates {
        if let Ok(reference) = repo.find_reference(candidate) {
            if let Ok(commit) = reference.peel_to_commit() {
                return Ok(commit);
            }
        }
    }

    if let Ok(oid) = Oid::from_str(refname) {
        if let Ok(commit) = repo.find_commit(oid) {
            return Ok(commit);
        }
    }

    if let Ok(obj) = repo.revparse_single(refname) {
        if let Ok(commit) = obj.peel_to_commit() {
            return Ok(commit);
        }
    }

    Err(error::git_operation_failed(
        "rev-parse",
        refname,
        "Could not resolve reference",
    ))
}

/// Pick the commit a ref names out of `git ls-remote` output
///
/// Branches win over tags; annotated tags use their peeled (`^{}`) line.
/// `git ls-remote` matches patterns by trailing path components, so only
/// exact refnames are accepted.
pub fn parse_ls_remote(stdout: &str, git_ref: &str) -> Option<String> {
    let lines: Vec<(&str, &str)> = stdout
        .lines()
        .filter_map(|line| line.split_once(char::is_whitespace))
        .map(|(sha, name)| (sha.trim(), name.trim()))
        .filter(|(sha, _)| sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit()))
        .collect();

    let preferred = [
        format!("refs/heads/{git_ref}"),
        format!("refs/tags/{git_ref}^{{}}"),
        format!("refs/tags/{git_ref}"),
        git_ref.to_string(),
    ];

    preferred
        .iter()
        .find_map(|want| lines.iter().find(|(_, name)| name == want))
        .map(|(sha, _)| sha.to_ascii_lowercase())
}

/// Commit `git_ref` points at on the remote, `None` when the ref is absent
pub fn ls_remote(url: &str, git_ref: &str, limit: Duration) -> Result<Option<String>> {
    let mut command = Command::new("git");
    command
        .args(["ls-remote", url, git_ref])
        .env("GIT_TERMINAL_PROMPT", "0");

    tracing::debug!(url, git_ref, "querying remote ref");

    let captured = process::run_with_deadline(command, limit)
        .map_err(|e| error::git_operation_failed("ls-remote", url, e.to_string()))?
        .ok_or_else(|| error::git_timeout("ls-remote", url, limit))?;

    if !captured.status.success() {
        return Err(error::git_operation_failed(
            "ls-remote",
            url,
            captured.stderr.trim(),
        ));
    }

    Ok(parse_ls_remote(&captured.stdout, git_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "1111111111111111111111111111111111111111";
    const B: &str = "2222222222222222222222222222222222222222";
    const C: &str = "3333333333333333333333333333333333333333";

    #[test]
    fn test_parse_branch() {
        let out = format!("{A}\trefs/heads/main\n{B}\trefs/remotes/origin/main\n");
        assert_eq!(parse_ls_remote(&out, "main").as_deref(), Some(A));
    }

    #[test]
    fn test_parse_annotated_tag_prefers_peeled() {
        let out = format!("{A}\trefs/tags/v1.0\n{B}\trefs/tags/v1.0^{{}}\n");
        assert_eq!(parse_ls_remote(&out, "v1.0").as_deref(), Some(B));
    }

    #[test]
    fn test_parse_branch_beats_tag() {
        let out = format!("{C}\trefs/tags/release\n{A}\trefs/heads/release\n");
        assert_eq!(parse_ls_remote(&out, "release").as_deref(), Some(A));
    }

    #[test]
    fn test_parse_empty_output_is_none() {
        assert_eq!(parse_ls_remote("", "main"), None);
    }

    #[test]
    fn test_parse_ignores_trailing_component_matches() {
        let out = format!("{A}\trefs/heads/feature/main\n{B}\trefs/tags/old/main\n");
        assert_eq!(parse_ls_remote(&out, "main"), None);
    }

    #[test]
    fn test_parse_prefers_exact_ref_among_suffix_matches() {
        let out = format!("{A}\trefs/heads/feature/main\n{C}\trefs/heads/main\n");
        assert_eq!(parse_ls_remote(&out, "main").as_deref(), Some(C));
    }

    #[test]
    fn test_parse_full_refname() {
        let out = format!("{A}\trefs/heads/main\n");
        assert_eq!(parse_ls_remote(&out, "refs/heads/main").as_deref(), Some(A));
    }
}
