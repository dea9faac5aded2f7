//! Resolve operation: graft.yaml to graft.lock

use crate::config::lockfile::LockFile;
use crate::error::Result;

use super::context::OperationContext;

/// How the lock file changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub lockfile: LockFile,
    pub added: Vec<String>,
    pub removed: Vec<String>,

    /// Entries whose source, ref or commit moved
    pub changed: Vec<String>,
}

/// Resolve every declared dependency and rewrite the lock file
pub fn resolve(ctx: &OperationContext<'_>) -> Result<ResolveOutcome> {
    let config = ctx.load_config()?;
    let store = ctx.lock_store();

    let previous = match store.load() {
        Ok(previous) => previous.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("ignoring unreadable lock file: {e}");
            LockFile::new()
        }
    };

    let resolution = ctx.resolver().resolve(&config)?;
    let lockfile = LockFile::from_entries(resolution);
    store.save(&lockfile)?;

    let outcome = diff(&previous, lockfile);
    tracing::info!(
        added = outcome.added.len(),
        removed = outcome.removed.len(),
        changed = outcome.changed.len(),
        "lock file written"
    );
    Ok(outcome)
}

fn diff(previous: &LockFile, lockfile: LockFile) -> ResolveOutcome {
    let mut outcome = ResolveOutcome::default();

    for (name, entry) in &lockfile.dependencies {
        match previous.get(name) {
            None => outcome.added.push(name.clone()),
            Some(old) if old.version() != entry.version() || old.commit != entry.commit => {
                outcome.changed.push(name.clone());
            }
            Some(_) => {}
        }
    }
    outcome.removed = previous
        .dependencies
        .keys()
        .filter(|name| !lockfile.dependencies.contains_key(*name))
        .cloned()
        .collect();

    outcome.lockfile = lockfile;
    outcome
}
