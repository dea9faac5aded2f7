//! Common test utilities for graft integration tests
//!
//! Dependencies are real git repositories in a temporary directory, referred
//! to by `file://` URLs, so the tests exercise libgit2 clones and
//! `git ls-remote` without network access.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::TempDir;

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated, dead_code)]
pub fn graft_cmd() -> Command {
    Command::cargo_bin("graft").unwrap()
}

#[allow(dead_code)]
fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "graft tests")
        .env("GIT_AUTHOR_EMAIL", "tests@example.com")
        .env("GIT_COMMITTER_NAME", "graft tests")
        .env("GIT_COMMITTER_EMAIL", "tests@example.com")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A git repository standing in for a remote dependency
#[allow(dead_code)]
pub struct GitRepo {
    pub path: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    pub fn init(path: PathBuf) -> Self {
        std::fs::create_dir_all(&path).expect("Failed to create repository directory");
        git(&path, &["init", "--quiet", "--initial-branch=main"]);
        Self { path }
    }

    /// `file://` URL usable in graft.yaml
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// Write `files` and commit them, returning the new commit
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        for (name, content) in files {
            let file = self.path.join(name);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            std::fs::write(file, content).expect("Failed to write file");
        }
        git(&self.path, &["add", "--all"]);
        git(&self.path, &["commit", "--quiet", "-m", message]);
        self.head()
    }

    pub fn tag(&self, name: &str) {
        git(&self.path, &["tag", name]);
    }

    pub fn head(&self) -> String {
        git(&self.path, &["rev-parse", "HEAD"])
    }
}

/// A consumer repository plus the remotes it depends on
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Holds every directory below
    pub temp: TempDir,

    /// Workspace root (contains graft.yaml)
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("workspace");
        std::fs::create_dir_all(&path).expect("Failed to create workspace directory");
        Self { temp, path }
    }

    /// New remote repository named `name`
    pub fn remote(&self, name: &str) -> GitRepo {
        GitRepo::init(self.temp.path().join("remotes").join(name))
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write graft.yaml declaring `deps` as `(name, "url#ref")` pairs
    pub fn declare(&self, deps: &[(&str, String)]) {
        let mut yaml = String::from("apiVersion: graft/v0\ndeps:\n");
        for (name, value) in deps {
            yaml.push_str(&format!("  {name}: \"{value}\"\n"));
        }
        self.write_file("graft.yaml", &yaml);
    }

    /// graft invoked inside the workspace
    pub fn graft(&self) -> Command {
        let mut cmd = graft_cmd();
        cmd.current_dir(&self.path)
            .env_remove("GRAFT_WORKSPACE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Commit recorded for `name` in graft.lock
    pub fn locked_commit(&self, name: &str) -> String {
        let lock: serde_yaml::Value =
            serde_yaml::from_str(&self.read_file("graft.lock")).expect("Invalid graft.lock");
        lock["dependencies"][name]["commit"]
            .as_str()
            .expect("No commit for dependency")
            .to_string()
    }

    /// Files in the snapshots directory
    pub fn snapshot_files(&self) -> usize {
        std::fs::read_dir(self.path.join(".graft/.snapshots"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
