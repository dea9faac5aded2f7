//! Test fixtures and in-memory capabilities.
//!
//! The resolver, upgrade orchestrator and validator only see git, the shell
//! and the file system through traits. The fakes here stand in for all
//! three so unit tests never touch the network or a real repository.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeGit, MemoryFs, create_temp_dir};
//!
//! let git = FakeGit::new();
//! git.add_ref("https://example.com/kb.git", "main", &commit('a'));
//! let fs = MemoryFs::new();
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::fs::FileSystem;
use crate::config::lockfile::is_commit_hash;
use crate::error::{self, GraftError, Result};
use crate::exec::{CommandExecutor, CommandOutput, Invocation};
use crate::git::GitOps;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A 40-character commit hash made of one repeated hex digit
#[must_use]
pub fn commit(digit: char) -> String {
    std::iter::repeat_n(digit, 40).collect()
}

#[derive(Debug, Default)]
struct FakeRepo {
    refs: BTreeMap<String, String>,
    files: BTreeMap<(String, String), String>,
}

/// In-memory git with scripted remotes and checkouts
#[derive(Debug, Default)]
pub struct FakeGit {
    repos: RefCell<BTreeMap<String, FakeRepo>>,
    checkouts: RefCell<BTreeMap<PathBuf, (String, String)>>,
    fetches: RefCell<Vec<(String, String)>>,
    unreachable: RefCell<BTreeSet<String>>,
}

impl FakeGit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `git_ref` of the remote at `url` to `commit`
    pub fn add_ref(&self, url: &str, git_ref: &str, commit: &str) {
        self.repos
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .refs
            .insert(git_ref.to_string(), commit.to_string());
    }

    /// Make `path` exist with `contents` at `commit` of the remote at `url`
    pub fn add_file(&self, url: &str, commit: &str, path: &str, contents: &str) {
        self.repos
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .files
            .insert((commit.to_string(), path.to_string()), contents.to_string());
    }

    /// Move a checkout without going through `clone_or_fetch`
    pub fn set_checkout(&self, dest: &Path, url: &str, commit: &str) {
        self.checkouts
            .borrow_mut()
            .insert(dest.to_path_buf(), (url.to_string(), commit.to_string()));
    }

    /// Every network operation against `url` times out
    pub fn make_unreachable(&self, url: &str) {
        self.unreachable.borrow_mut().insert(url.to_string());
    }

    /// `(url, ref)` pairs passed to `clone_or_fetch`, in call order
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.borrow().clone()
    }

    fn check_reachable(&self, operation: &str, url: &str) -> Result<()> {
        if self.unreachable.borrow().contains(url) {
            return Err(error::git_timeout(
                operation,
                url,
                std::time::Duration::from_secs(5),
            ));
        }
        Ok(())
    }
}

impl GitOps for FakeGit {
    fn clone_or_fetch(&self, url: &str, git_ref: &str, dest: &Path) -> Result<()> {
        self.fetches
            .borrow_mut()
            .push((url.to_string(), git_ref.to_string()));
        self.check_reachable("fetch", url)?;

        let repos = self.repos.borrow();
        let repo = repos
            .get(url)
            .ok_or_else(|| error::git_operation_failed("clone", url, "Repository not found"))?;
        let commit = match repo.refs.get(git_ref) {
            Some(commit) => commit.clone(),
            None if is_commit_hash(git_ref) => git_ref.to_string(),
            None => {
                return Err(error::git_operation_failed(
                    "resolve",
                    format!("{url}#{git_ref}"),
                    "ref not found in repository",
                ));
            }
        };

        self.set_checkout(dest, url, &commit);
        Ok(())
    }

    fn has_checkout(&self, dest: &Path) -> bool {
        self.checkouts.borrow().contains_key(dest)
    }

    fn commit_of(&self, dest: &Path) -> Result<String> {
        self.checkouts
            .borrow()
            .get(dest)
            .map(|(_, commit)| commit.clone())
            .ok_or_else(|| {
                error::git_operation_failed(
                    "open",
                    dest.display().to_string(),
                    "not a repository",
                )
            })
    }

    fn read_file_at(&self, dest: &Path, path: &str) -> Result<Option<String>> {
        let checkouts = self.checkouts.borrow();
        let (url, commit) = checkouts.get(dest).ok_or_else(|| {
            error::git_operation_failed("open", dest.display().to_string(), "not a repository")
        })?;
        Ok(self.repos.borrow().get(url).and_then(|repo| {
            repo.files
                .get(&(commit.clone(), path.to_string()))
                .cloned()
        }))
    }

    fn ls_remote(&self, url: &str, git_ref: &str) -> Result<Option<String>> {
        self.check_reachable("ls-remote", url)?;
        let repos = self.repos.borrow();
        let repo = repos
            .get(url)
            .ok_or_else(|| error::git_operation_failed("ls-remote", url, "Repository not found"))?;
        Ok(repo.refs.get(git_ref).cloned())
    }
}

type Observer = Box<dyn Fn(&Invocation)>;

/// Executor that returns scripted results instead of running anything
#[derive(Default)]
pub struct FakeExecutor {
    results: RefCell<BTreeMap<String, std::result::Result<CommandOutput, GraftError>>>,
    invocations: RefCell<Vec<Invocation>>,
    observer: Option<Observer>,
}

impl FakeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with every invocation before its result is returned
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&Invocation) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Make the next run of `name` exit with `code` and print `stderr`
    pub fn exit_with(&self, name: &str, code: i32, stderr: &str) {
        self.results.borrow_mut().insert(
            name.to_string(),
            Ok(CommandOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        );
    }

    /// Make the next run of `name` time out
    pub fn time_out(&self, name: &str) {
        self.results.borrow_mut().insert(
            name.to_string(),
            Err(GraftError::CommandTimeout {
                name: name.to_string(),
                seconds: 1,
            }),
        );
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    pub fn ran(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|inv| inv.name.clone())
            .collect()
    }
}

impl CommandExecutor for FakeExecutor {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push(invocation.clone());
        if let Some(observer) = &self.observer {
            observer(invocation);
        }
        match self.results.borrow_mut().remove(&invocation.name) {
            Some(result) => result,
            None => Ok(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            }),
        }
    }
}

/// File system kept in a map, with injectable write failures
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: std::rc::Rc<RefCell<BTreeMap<PathBuf, Vec<u8>>>>,
    failing: std::rc::Rc<RefCell<BTreeSet<PathBuf>>>,
    failing_once: std::rc::Rc<RefCell<BTreeSet<PathBuf>>>,
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), contents.into());
    }

    /// Every write to `path` fails
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.borrow_mut().insert(path.into());
    }

    /// Only the next write to `path` fails
    pub fn fail_next_write_to(&self, path: impl Into<PathBuf>) {
        self.failing_once.borrow_mut().insert(path.into());
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Current contents of `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let once = self.failing_once.borrow_mut().remove(path);
        if once || self.failing.borrow().contains(path) {
            return Err(error::file_write_failed(path, "disk full"));
        }
        self.insert(path, contents);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.files.borrow_mut().remove(path);
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }
}
