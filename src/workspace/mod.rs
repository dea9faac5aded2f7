//! Workspace management for graft
//!
//! This module handles:
//! - Workspace detection (walking up to the nearest `graft.yaml`)
//! - Paths of tool-owned state
//! - Workspace locking for concurrent access
//!
//! ## Workspace Structure
//!
//! ```text
//! <repo>/
//! ├── graft.yaml            # Dependency declaration
//! ├── graft.lock            # Resolved dependencies
//! └── .graft/
//!     ├── .lock             # Advisory lock file
//!     ├── .snapshots/       # Lock file snapshots for rollback
//!     └── <dep-name>/       # Dependency checkouts
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fslock::LockFile;

use crate::config::graft::CONFIG_FILE;
use crate::config::lockfile::LOCKFILE_NAME;
use crate::error::{self, GraftError, Result};

/// Tool-owned state directory name
pub const STATE_DIR: &str = ".graft";

/// Snapshots subdirectory of the state directory
pub const SNAPSHOTS_DIR: &str = ".snapshots";

/// Lock file for workspace locking
pub const LOCK_FILE: &str = ".lock";

/// A repository that declares dependencies in graft.yaml
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing graft.yaml
    pub root: PathBuf,
}

impl Workspace {
    /// Detect if a workspace exists at the given path
    pub fn exists(root: &Path) -> bool {
        root.join(CONFIG_FILE).is_file()
    }

    /// Find a workspace by searching upward from the given path
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if Self::exists(&current) {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Open the workspace containing `start`
    pub fn open(start: &Path) -> Result<Self> {
        let start = dunce::canonicalize(start).map_err(|e| error::file_read_failed(start, e))?;
        let root = Self::find_from(&start)
            .ok_or_else(|| error::config::not_found(start.join(CONFIG_FILE).display().to_string()))?;
        tracing::debug!(root = %root.display(), "opened workspace");
        Ok(Self { root })
    }

    /// Open the workspace from an explicit directory or the current one
    pub fn discover(workspace: Option<&Path>) -> Result<Self> {
        match workspace {
            Some(path) => Self::open(path),
            None => Self::open(&std::env::current_dir()?),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCKFILE_NAME)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.state_dir().join(SNAPSHOTS_DIR)
    }

    /// Checkout location of a dependency
    pub fn checkout_dir(&self, name: &str) -> PathBuf {
        self.state_dir().join(name)
    }

    /// Acquire a lock on this workspace
    pub fn lock(&self) -> Result<WorkspaceGuard> {
        WorkspaceGuard::acquire(&self.state_dir())
    }
}

/// RAII guard for workspace locking
///
/// Acquires an advisory file lock on creation and releases it on drop.
/// A second invocation against the same workspace blocks until then.
#[derive(Debug)]
pub struct WorkspaceGuard {
    lock: LockFile,
}

impl WorkspaceGuard {
    /// Acquire a lock on the workspace (blocking)
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        let mut lock = Self::open(state_dir)?;
        lock.lock().map_err(|e| GraftError::WorkspaceLockFailed {
            reason: format!("Failed to acquire lock: {e}"),
        })?;
        Ok(Self { lock })
    }

    /// Try to acquire a lock without blocking
    #[cfg(test)]
    pub fn try_acquire(state_dir: &Path) -> Result<Option<Self>> {
        let mut lock = Self::open(state_dir)?;
        let acquired = lock
            .try_lock()
            .map_err(|e| GraftError::WorkspaceLockFailed {
                reason: format!("Failed to try lock: {e}"),
            })?;
        Ok(acquired.then_some(Self { lock }))
    }

    fn open(state_dir: &Path) -> Result<LockFile> {
        fs::create_dir_all(state_dir).map_err(|e| GraftError::WorkspaceLockFailed {
            reason: format!("Failed to create {}: {e}", state_dir.display()),
        })?;
        let lock_path = state_dir.join(LOCK_FILE);
        LockFile::open(&lock_path).map_err(|e| GraftError::WorkspaceLockFailed {
            reason: format!("Failed to open lock file: {e}"),
        })
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
    }
}
