//! Shared context for graft operations
//!
//! Bundles the workspace paths with the capabilities every operation
//! reaches for, so resolve, apply and upgrade can be driven by real git
//! and disk in production and by in-memory fakes in tests.

use crate::common::fs::FileSystem;
use crate::config::graft::GraftConfig;
use crate::config::lockfile::{LockEntry, LockStore};
use crate::config::Timeouts;
use crate::error::{self, Result};
use crate::exec::CommandExecutor;
use crate::git::GitOps;
use crate::progress::ProgressDisplay;
use crate::resolver::Resolver;
use crate::snapshot::SnapshotManager;
use crate::workspace::Workspace;

/// Workspace plus the capabilities an operation runs against
pub struct OperationContext<'a> {
    pub workspace: &'a Workspace,
    pub git: &'a dyn GitOps,
    pub fs: &'a dyn FileSystem,
    pub executor: &'a dyn CommandExecutor,
    pub timeouts: Timeouts,

    /// Show a fetch spinner on interactive terminals
    pub show_progress: bool,
}

impl<'a> OperationContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        git: &'a dyn GitOps,
        fs: &'a dyn FileSystem,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            workspace,
            git,
            fs,
            executor,
            timeouts: Timeouts::default(),
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn lock_store(&self) -> LockStore<'a> {
        LockStore::new(self.fs, self.workspace.lock_path())
    }

    pub fn snapshots(&self) -> SnapshotManager<'a> {
        SnapshotManager::new(
            self.fs,
            self.workspace.lock_path(),
            self.workspace.snapshots_dir(),
        )
    }

    pub fn resolver(&self) -> Resolver<'a> {
        let resolver = Resolver::new(self.git, self.workspace.state_dir());
        if self.show_progress {
            resolver.with_progress(ProgressDisplay::new())
        } else {
            resolver
        }
    }

    /// The workspace's own graft.yaml, read through the file system capability
    pub fn load_config(&self) -> Result<GraftConfig> {
        let path = self.workspace.config_path();
        let label = path.display().to_string();
        let bytes = self
            .fs
            .read(&path)?
            .ok_or_else(|| error::config::not_found(&label))?;
        let yaml = String::from_utf8(bytes)
            .map_err(|e| error::schema(&label, format!("not valid UTF-8: {e}")))?;
        GraftConfig::from_yaml(&yaml, &label)
    }

    /// Move a checkout back to its locked commit; failures are only logged
    pub fn restore_checkout(&self, name: &str, entry: &LockEntry) {
        let dest = self.workspace.checkout_dir(name);
        match self.git.clone_or_fetch(&entry.source, &entry.commit, &dest) {
            Ok(()) => tracing::debug!(name, commit = %entry.short_commit(), "checkout restored"),
            Err(e) => tracing::warn!(name, "could not restore checkout: {e}"),
        }
    }
}
