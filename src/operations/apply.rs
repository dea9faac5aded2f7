//! Apply operation: re-pin one dependency without migrations

use crate::config::lockfile::{LockEntry, LockFile};
use crate::error::{GraftError, Result};

use super::context::OperationContext;

/// A dependency moved to another ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub name: String,
    pub from: LockEntry,
    pub to: LockEntry,

    /// Transitive entries pulled in by the new version
    pub added: Vec<String>,

    /// Transitive entries nothing requires any more
    pub removed: Vec<String>,
}

/// Point `name` at `to_ref` in the lock file
///
/// graft.yaml is left untouched; a declaration still naming the old ref
/// is reported as a warning.
pub fn apply(ctx: &OperationContext<'_>, name: &str, to_ref: &str) -> Result<ApplyOutcome> {
    let store = ctx.lock_store();
    let lockfile = store.load_required()?;
    let from = lockfile
        .get(name)
        .cloned()
        .ok_or_else(|| GraftError::DependencyNotFound {
            name: name.to_string(),
        })?;

    warn_on_declared_drift(ctx, name, to_ref);

    let resolver = ctx.resolver();
    let target = from.spec(name).at_ref(to_ref);
    let repinned = resolver
        .fetch(&target)
        .and_then(|fetched| resolver.repin(lockfile.dependencies.clone(), &target, &fetched))
        .and_then(|resolution| {
            let updated = LockFile::from_entries(resolution);
            store.save(&updated)?;
            Ok(updated)
        });

    let updated = match repinned {
        Ok(updated) => updated,
        Err(e) => {
            ctx.restore_checkout(name, &from);
            return Err(e);
        }
    };

    let to = updated
        .get(name)
        .cloned()
        .ok_or_else(|| GraftError::DependencyNotFound {
            name: name.to_string(),
        })?;
    let added = updated
        .dependencies
        .keys()
        .filter(|n| !lockfile.dependencies.contains_key(*n))
        .cloned()
        .collect();
    let removed = lockfile
        .dependencies
        .keys()
        .filter(|n| !updated.dependencies.contains_key(*n))
        .cloned()
        .collect();

    tracing::info!(name, from = %from.git_ref, to = %to.git_ref, "dependency applied");
    Ok(ApplyOutcome {
        name: name.to_string(),
        from,
        to,
        added,
        removed,
    })
}

fn warn_on_declared_drift(ctx: &OperationContext<'_>, name: &str, to_ref: &str) {
    let Ok(config) = ctx.load_config() else {
        return;
    };
    if let Some(declared) = config.deps.get(name) {
        if declared.git_ref != to_ref {
            tracing::warn!(
                name,
                declared = %declared.git_ref,
                applied = to_ref,
                "graft.yaml still declares a different ref; the next resolve will revert this"
            );
        }
    }
}
