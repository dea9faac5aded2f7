use super::*;

use std::path::PathBuf;

use git2::{Oid, Signature};
use tempfile::TempDir;

use crate::error::GraftError;
use crate::test_fixtures::create_temp_dir;

/// Upstream repository with helpers to add commits
struct Upstream {
    _temp: TempDir,
    path: PathBuf,
    repo: Repository,
}

impl Upstream {
    fn new() -> Self {
        let temp = create_temp_dir();
        let path = temp.path().join("upstream");
        let repo = Repository::init(&path).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        Self {
            _temp: temp,
            path,
            repo,
        }
    }

    fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn commit(&self, file: &str, contents: &str) -> Oid {
        fs::write(self.path.join(file), contents).unwrap();
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parents: Vec<_> = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<_> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, file, &tree, &parents)
            .unwrap()
    }

    fn tag(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &obj, false).unwrap();
    }
}

fn git() -> SystemGit {
    SystemGit::new(Timeouts::default())
}

#[test]
fn test_clone_checks_out_branch_and_tag() {
    let upstream = Upstream::new();
    let first = upstream.commit("README.md", "v1");
    upstream.tag("v1.0.0", first);
    let second = upstream.commit("README.md", "v2");

    let work = create_temp_dir();
    let dest = work.path().join(".graft/kb");

    git().clone_or_fetch(&upstream.url(), "main", &dest).unwrap();
    assert_eq!(git().commit_of(&dest).unwrap(), second.to_string());

    git().clone_or_fetch(&upstream.url(), "v1.0.0", &dest).unwrap();
    assert_eq!(git().commit_of(&dest).unwrap(), first.to_string());
    assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "v1");
}

#[test]
fn test_fetch_picks_up_new_commits() {
    let upstream = Upstream::new();
    upstream.commit("README.md", "one");

    let work = create_temp_dir();
    let dest = work.path().join("kb");
    git().clone_or_fetch(&upstream.url(), "main", &dest).unwrap();

    let newer = upstream.commit("README.md", "two");
    git().clone_or_fetch(&upstream.url(), "main", &dest).unwrap();

    assert_eq!(git().commit_of(&dest).unwrap(), newer.to_string());
}

#[test]
fn test_checkout_by_commit_hash() {
    let upstream = Upstream::new();
    let first = upstream.commit("a.txt", "a");
    upstream.commit("a.txt", "b");

    let work = create_temp_dir();
    let dest = work.path().join("kb");
    git()
        .clone_or_fetch(&upstream.url(), &first.to_string(), &dest)
        .unwrap();

    assert_eq!(git().commit_of(&dest).unwrap(), first.to_string());
}

#[test]
fn test_unknown_ref_fails() {
    let upstream = Upstream::new();
    upstream.commit("a.txt", "a");

    let work = create_temp_dir();
    let dest = work.path().join("kb");
    let err = git()
        .clone_or_fetch(&upstream.url(), "no-such-branch", &dest)
        .unwrap_err();

    assert!(matches!(err, GraftError::GitOperationFailed { .. }));
}

#[test]
fn test_checkout_of_other_source_is_replaced() {
    let first = Upstream::new();
    first.commit("a.txt", "first");
    let second = Upstream::new();
    let expected = second.commit("a.txt", "second");

    let work = create_temp_dir();
    let dest = work.path().join("kb");
    git().clone_or_fetch(&first.url(), "main", &dest).unwrap();
    git().clone_or_fetch(&second.url(), "main", &dest).unwrap();

    assert_eq!(git().commit_of(&dest).unwrap(), expected.to_string());
}

#[test]
fn test_read_file_at_head() {
    let upstream = Upstream::new();
    upstream.commit("graft.yaml", "apiVersion: graft/v0\n");

    let work = create_temp_dir();
    let dest = work.path().join("kb");
    git().clone_or_fetch(&upstream.url(), "main", &dest).unwrap();

    assert_eq!(
        git().read_file_at(&dest, "graft.yaml").unwrap().as_deref(),
        Some("apiVersion: graft/v0\n")
    );
    assert_eq!(git().read_file_at(&dest, "missing.yaml").unwrap(), None);
}

#[test]
fn test_commit_of_missing_checkout_fails() {
    let work = create_temp_dir();
    let absent = work.path().join("absent");
    assert!(!git().has_checkout(&absent));
    assert!(git().commit_of(&absent).is_err());
}
