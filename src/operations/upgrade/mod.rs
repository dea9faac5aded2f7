//! Atomic upgrade of one dependency
//!
//! ```text
//! Idle -> SnapshotCreated -> MigrationRun -> VerificationRun -> LockUpdated -> CleanedUp
//!                  \______________ any failure ______________/
//!                                      |
//!                                  RolledBack
//! ```
//!
//! The lock file is snapshotted before anything moves. A failed fetch,
//! migration, verification or lock write restores the snapshot, so the
//! lock file after a failed upgrade is byte-identical to before it.

mod plan;


use std::collections::BTreeMap;
use std::fmt;

use crate::config::graft::{CONFIG_FILE, GraftConfig};
use crate::config::lockfile::{LockEntry, LockFile, is_commit_hash};
use crate::error::{self, GraftError, Result};
use crate::exec::Invocation;

use super::context::OperationContext;
pub use plan::{ChangeOrigin, PlannedChange};

/// Snapshot operation label
const SNAPSHOT_OPERATION: &str = "upgrade";

/// Options for an upgrade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpgradeOptions {
    pub skip_migration: bool,
    pub skip_verify: bool,
    pub dry_run: bool,

    /// Keep the snapshot after a successful upgrade
    pub keep_snapshot: bool,
}

/// Where an upgrade got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradePhase {
    Idle,
    SnapshotCreated,
    MigrationRun,
    VerificationRun,
    LockUpdated,
    CleanedUp,
    RolledBack,
}

impl fmt::Display for UpgradePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpgradePhase::Idle => "idle",
            UpgradePhase::SnapshotCreated => "snapshot created",
            UpgradePhase::MigrationRun => "migration run",
            UpgradePhase::VerificationRun => "verification run",
            UpgradePhase::LockUpdated => "lock updated",
            UpgradePhase::CleanedUp => "cleaned up",
            UpgradePhase::RolledBack => "rolled back",
        };
        f.write_str(label)
    }
}

/// Result of a successful (or dry) upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub name: String,
    pub phase: UpgradePhase,
    pub from_ref: String,
    pub to_ref: String,
    pub from_commit: String,
    pub to_commit: String,
    pub change: Option<PlannedChange>,

    /// Commands that ran, or would run for a dry run
    pub commands: Vec<String>,

    /// Snapshot kept for audit
    pub snapshot_id: Option<String>,
    pub dry_run: bool,
}

/// Moves one dependency to a new ref with migration, verification and rollback
pub struct UpgradeOperation<'c, 'a> {
    ctx: &'c OperationContext<'a>,
    options: UpgradeOptions,
    phase: UpgradePhase,
}

impl<'c, 'a> UpgradeOperation<'c, 'a> {
    pub fn new(ctx: &'c OperationContext<'a>, options: UpgradeOptions) -> Self {
        Self {
            ctx,
            options,
            phase: UpgradePhase::Idle,
        }
    }

    /// Last phase reached, `RolledBack` after a failure that was undone
    pub fn phase(&self) -> UpgradePhase {
        self.phase
    }

    fn advance(&mut self, phase: UpgradePhase) {
        tracing::debug!(from = %self.phase, to = %phase, "upgrade phase");
        self.phase = phase;
    }

    /// Upgrade `name` to `to_ref`
    pub fn execute(&mut self, name: &str, to_ref: &str) -> Result<UpgradeOutcome> {
        let lockfile = self.ctx.lock_store().load_required()?;
        let entry = lockfile
            .get(name)
            .cloned()
            .ok_or_else(|| GraftError::DependencyNotFound {
                name: name.to_string(),
            })?;
        let consumer = self.ctx.load_config()?;

        if self.options.dry_run {
            return self.plan(name, &entry, to_ref, &consumer);
        }

        let snapshot_id = self.ctx.snapshots().create(SNAPSHOT_OPERATION)?;
        self.advance(UpgradePhase::SnapshotCreated);
        tracing::info!(name, from = %entry.git_ref, to = to_ref, snapshot = %snapshot_id, "upgrading");

        match self.run_steps(name, &entry, to_ref, &consumer, lockfile) {
            Ok(mut outcome) => {
                outcome.snapshot_id = self.finish(&snapshot_id);
                outcome.phase = self.phase;
                Ok(outcome)
            }
            Err(cause) => Err(self.rollback(name, &entry, &snapshot_id, cause)),
        }
    }

    /// Report what an upgrade would do without touching anything
    fn plan(
        &self,
        name: &str,
        entry: &LockEntry,
        to_ref: &str,
        consumer: &GraftConfig,
    ) -> Result<UpgradeOutcome> {
        let to_commit = if is_commit_hash(to_ref) {
            to_ref.to_string()
        } else {
            self.ctx
                .git
                .ls_remote(&entry.source, to_ref)?
                .ok_or_else(|| {
                    error::git_operation_failed(
                        "ls-remote",
                        format!("{}#{to_ref}", entry.source),
                        "ref not found on remote",
                    )
                })?
        };

        // The target declaration is not available without a checkout, so
        // fall back to what the current checkout declares.
        let dest = self.ctx.workspace.checkout_dir(name);
        let current = self
            .ctx
            .git
            .read_file_at(&dest, CONFIG_FILE)
            .ok()
            .flatten()
            .and_then(|yaml| GraftConfig::parse(&yaml, CONFIG_FILE).ok());
        let change = plan::find_change(to_ref, current.as_ref(), consumer);
        let commands = change
            .as_ref()
            .map(|c| c.command_names(self.options))
            .unwrap_or_default();

        Ok(UpgradeOutcome {
            name: name.to_string(),
            phase: self.phase,
            from_ref: entry.git_ref.clone(),
            to_ref: to_ref.to_string(),
            from_commit: entry.commit.clone(),
            to_commit,
            change,
            commands,
            snapshot_id: None,
            dry_run: true,
        })
    }

    fn run_steps(
        &mut self,
        name: &str,
        entry: &LockEntry,
        to_ref: &str,
        consumer: &GraftConfig,
        lockfile: LockFile,
    ) -> Result<UpgradeOutcome> {
        let resolver = self.ctx.resolver();
        let target = entry.spec(name).at_ref(to_ref);
        let fetched = resolver.fetch(&target)?;

        let dest = self.ctx.workspace.checkout_dir(name);
        let declaration = match self.ctx.git.read_file_at(&dest, CONFIG_FILE)? {
            Some(yaml) => Some(GraftConfig::from_yaml(&yaml, &format!("{name}/{CONFIG_FILE}"))?),
            None => None,
        };
        let change = plan::find_change(to_ref, declaration.as_ref(), consumer);
        let env = upgrade_env(self.ctx, name, entry, to_ref, &fetched.commit);
        let mut commands = Vec::new();

        if let Some(command) = change.as_ref().and_then(|c| c.migration.as_ref()) {
            if self.options.skip_migration {
                tracing::info!(command = %command.name, "skipping migration");
            } else {
                self.run_command(command, &env)?;
                commands.push(command.name.clone());
            }
        }
        self.advance(UpgradePhase::MigrationRun);

        if let Some(command) = change.as_ref().and_then(|c| c.verify.as_ref()) {
            if self.options.skip_verify {
                tracing::info!(command = %command.name, "skipping verification");
            } else {
                self.run_command(command, &env)?;
                commands.push(command.name.clone());
            }
        }
        self.advance(UpgradePhase::VerificationRun);

        let resolution = resolver.repin(lockfile.dependencies, &target, &fetched)?;
        self.ctx
            .lock_store()
            .save(&LockFile::from_entries(resolution))?;
        self.advance(UpgradePhase::LockUpdated);

        Ok(UpgradeOutcome {
            name: name.to_string(),
            phase: self.phase,
            from_ref: entry.git_ref.clone(),
            to_ref: to_ref.to_string(),
            from_commit: entry.commit.clone(),
            to_commit: fetched.commit,
            change,
            commands,
            snapshot_id: None,
            dry_run: false,
        })
    }

    fn run_command(
        &self,
        command: &crate::config::Command,
        env: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut merged = env.clone();
        merged.extend(command.env.clone());
        let invocation = Invocation {
            name: command.name.clone(),
            run: command.run.clone(),
            working_dir: command.resolve_working_dir(&self.ctx.workspace.root),
            env: merged,
            timeout: self.ctx.timeouts.command,
        };

        tracing::info!(command = %command.name, "running command");
        let output = self.ctx.executor.run(&invocation)?;
        if !output.stdout.is_empty() {
            tracing::debug!(command = %command.name, stdout = %output.stdout.trim_end(), "command output");
        }
        if !output.success() {
            return Err(GraftError::CommandFailed {
                name: command.name.clone(),
                status: output.status_label(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    /// Drop the snapshot unless asked to keep it; returns the kept id
    fn finish(&mut self, snapshot_id: &str) -> Option<String> {
        if self.options.keep_snapshot {
            tracing::info!(snapshot = snapshot_id, "keeping snapshot");
            self.advance(UpgradePhase::CleanedUp);
            return Some(snapshot_id.to_string());
        }
        if let Err(e) = self.ctx.snapshots().cleanup(snapshot_id) {
            tracing::warn!(snapshot = snapshot_id, "could not remove snapshot: {e}");
        }
        self.advance(UpgradePhase::CleanedUp);
        None
    }

    /// Put the lock file and checkout back, then hand the cause back
    fn rollback(
        &mut self,
        name: &str,
        entry: &LockEntry,
        snapshot_id: &str,
        cause: GraftError,
    ) -> GraftError {
        tracing::warn!(name, phase = %self.phase, "upgrade failed, rolling back: {cause}");

        let snapshots = self.ctx.snapshots();
        if let Err(e) = snapshots.restore(snapshot_id) {
            tracing::error!(snapshot = snapshot_id, "rollback failed: {e}");
            return GraftError::RollbackFailed {
                cause: cause.to_string(),
                reason: e.to_string(),
            };
        }
        self.ctx.restore_checkout(name, entry);

        if !self.options.keep_snapshot {
            if let Err(e) = snapshots.cleanup(snapshot_id) {
                tracing::warn!(snapshot = snapshot_id, "could not remove snapshot: {e}");
            }
        }
        self.advance(UpgradePhase::RolledBack);
        cause
    }
}

/// Environment every migration and verification command receives
fn upgrade_env(
    ctx: &OperationContext<'_>,
    name: &str,
    entry: &LockEntry,
    to_ref: &str,
    to_commit: &str,
) -> BTreeMap<String, String> {
    let dep_dir = ctx.workspace.checkout_dir(name);
    BTreeMap::from([
        ("GRAFT_DEP_NAME".to_string(), name.to_string()),
        ("GRAFT_DEP_DIR".to_string(), dep_dir.display().to_string()),
        ("GRAFT_FROM_REF".to_string(), entry.git_ref.clone()),
        ("GRAFT_TO_REF".to_string(), to_ref.to_string()),
        ("GRAFT_FROM_COMMIT".to_string(), entry.commit.clone()),
        ("GRAFT_TO_COMMIT".to_string(), to_commit.to_string()),
    ])
}
