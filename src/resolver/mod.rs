//! Dependency resolution for graft
//!
//! This module handles:
//! - Breadth-first resolution of direct and transitive dependencies
//! - Conflict detection against the first-seen resolution of a name
//! - Circular dependency detection
//! - Re-pinning one entry and pruning what it no longer requires
//!
//! Discovery order never reaches the output: `requires` and `required_by`
//! are kept sorted and the lock file has its own canonical order.

pub mod validation;


use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::graft::{CONFIG_FILE, DependencySpec, GraftConfig};
use crate::config::lockfile::LockEntry;
use crate::config::lockfile::entry::ROOT_REQUIRER;
use crate::error::{GraftError, Result};
use crate::git::GitOps;
use crate::progress::ProgressDisplay;

/// Resolved entries by name
pub type Resolution = BTreeMap<String, LockEntry>;

/// A dependency checked out at the requested ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub commit: String,

    /// Dependencies the checkout's own graft.yaml declares
    pub deps: BTreeMap<String, DependencySpec>,
}

/// Queue item: a dependency waiting to be resolved
#[derive(Debug)]
struct Pending {
    spec: DependencySpec,
    parent: Option<String>,
    ancestry: Vec<String>,
}

/// Resolves declarations into pinned lock entries
pub struct Resolver<'a> {
    git: &'a dyn GitOps,
    checkouts: PathBuf,
    consumed_at: DateTime<Utc>,
    progress: ProgressDisplay,
}

impl<'a> Resolver<'a> {
    /// Resolver that checks dependencies out under `checkouts`
    pub fn new(git: &'a dyn GitOps, checkouts: impl Into<PathBuf>) -> Self {
        Self {
            git,
            checkouts: checkouts.into(),
            consumed_at: Utc::now(),
            progress: ProgressDisplay::hidden(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressDisplay) -> Self {
        self.progress = progress;
        self
    }

    /// Timestamp stamped on every entry this resolver produces
    #[cfg(test)]
    #[must_use]
    pub fn with_timestamp(mut self, consumed_at: DateTime<Utc>) -> Self {
        self.consumed_at = consumed_at;
        self
    }

    /// Checkout location of a dependency
    pub fn checkout_dir(&self, name: &str) -> PathBuf {
        self.checkouts.join(name)
    }

    /// Resolve every dependency `config` declares, transitively
    pub fn resolve(&self, config: &GraftConfig) -> Result<Resolution> {
        let queue = config
            .deps
            .values()
            .map(|spec| Pending {
                spec: spec.clone(),
                parent: None,
                ancestry: Vec::new(),
            })
            .collect();

        let resolution = self.run(Resolution::new(), queue)?;
        self.progress.finish();
        validation::check_graph(&resolution)?;
        tracing::info!(entries = resolution.len(), "resolution complete");
        Ok(resolution)
    }

    /// Resolve `deps` as requirements of `parent` on top of an existing resolution
    pub fn extend(
        &self,
        resolution: Resolution,
        parent: &str,
        deps: &BTreeMap<String, DependencySpec>,
    ) -> Result<Resolution> {
        let ancestry = validation::lineage(&resolution, parent);
        let queue = deps
            .values()
            .map(|spec| Pending {
                spec: spec.clone(),
                parent: Some(parent.to_string()),
                ancestry: ancestry.clone(),
            })
            .collect();

        let resolution = self.run(resolution, queue)?;
        self.progress.finish();
        validation::check_graph(&resolution)?;
        Ok(resolution)
    }

    /// Check `spec` out and read its own declaration
    pub fn fetch(&self, spec: &DependencySpec) -> Result<Fetched> {
        let dest = self.checkout_dir(&spec.name);
        self.progress.fetching(&spec.name, &spec.version());
        tracing::debug!(name = %spec.name, version = %spec.version(), "fetching dependency");

        self.git.clone_or_fetch(&spec.source, &spec.git_ref, &dest)?;
        let commit = self.git.commit_of(&dest)?;
        let deps = self.declared_deps(&spec.name, &dest)?;

        Ok(Fetched { commit, deps })
    }

    fn declared_deps(&self, name: &str, dest: &Path) -> Result<BTreeMap<String, DependencySpec>> {
        let Some(yaml) = self.git.read_file_at(dest, CONFIG_FILE)? else {
            return Ok(BTreeMap::new());
        };
        let label = format!("{name}/{CONFIG_FILE}");
        Ok(GraftConfig::from_yaml(&yaml, &label)?.deps)
    }

    /// Pin `spec.name` to an already fetched version and resolve what it now requires
    pub fn repin(
        &self,
        resolution: Resolution,
        spec: &DependencySpec,
        fetched: &Fetched,
    ) -> Result<Resolution> {
        let mut resolution = resolution;
        let entry = resolution
            .remove(&spec.name)
            .ok_or_else(|| GraftError::DependencyNotFound {
                name: spec.name.clone(),
            })?;

        let stale = stale_requirers(&entry, spec);
        if !stale.is_empty() {
            tracing::warn!(
                name = %spec.name,
                requirers = %stale.join(", "),
                "still required at {} by other dependencies; the lock no longer matches their declarations",
                entry.version()
            );
        }

        release(&mut resolution, &spec.name, &entry.requires);

        let entry = entry
            .with_version(&spec.git_ref, &fetched.commit, self.consumed_at)
            .with_requires(fetched.deps.keys());
        let entry = LockEntry {
            source: spec.source.clone(),
            ..entry
        };
        resolution.insert(spec.name.clone(), entry);

        self.extend(resolution, &spec.name, &fetched.deps)
    }

    fn run(&self, resolution: Resolution, queue: VecDeque<Pending>) -> Result<Resolution> {
        let mut resolution = resolution;
        let mut queue = queue;

        while let Some(item) = queue.pop_front() {
            let name = item.spec.name.clone();
            validation::check_cycle(&name, &item.ancestry)?;

            if let Some(existing) = resolution.get(&name) {
                let merged = merge(existing, &item)?;
                resolution.insert(name, merged);
                continue;
            }

            let fetched = self.fetch(&item.spec)?;
            let entry = LockEntry::new(
                &item.spec,
                &fetched.commit,
                self.consumed_at,
                item.parent.is_none(),
            )
            .with_requires(fetched.deps.keys());
            let entry = match &item.parent {
                Some(parent) => entry.with_dependent(parent),
                None => entry,
            };
            tracing::debug!(name = %name, commit = %entry.short_commit(), "resolved");
            resolution.insert(name.clone(), entry);

            let mut ancestry = item.ancestry;
            ancestry.push(name.clone());
            queue.extend(fetched.deps.into_values().map(|spec| Pending {
                spec,
                parent: Some(name.clone()),
                ancestry: ancestry.clone(),
            }));
        }

        Ok(resolution)
    }
}

/// Fold a repeated requirement into the first-seen entry, or report a conflict
fn merge(existing: &LockEntry, item: &Pending) -> Result<LockEntry> {
    let requirer = item.parent.as_deref().unwrap_or(ROOT_REQUIRER);

    if !existing.satisfies(&item.spec) {
        return Err(GraftError::Conflict {
            name: item.spec.name.clone(),
            first_requirer: existing.requirer().to_string(),
            first_version: existing.version(),
            second_requirer: requirer.to_string(),
            second_version: item.spec.version(),
        });
    }

    Ok(match &item.parent {
        Some(parent) => existing.clone().with_dependent(parent),
        None => existing.clone().with_direct(true),
    })
}

/// Dependents that required `entry` at a version `spec` moves away from
fn stale_requirers(entry: &LockEntry, spec: &DependencySpec) -> Vec<String> {
    if entry.satisfies(spec) {
        return Vec::new();
    }
    entry.required_by.clone()
}

/// Drop `parent` from the dependents of `names`, removing transitive
/// entries nobody requires any more
fn release(resolution: &mut Resolution, parent: &str, names: &[String]) {
    for name in names {
        let Some(entry) = resolution.remove(name) else {
            continue;
        };
        let entry = entry.without_dependent(parent);

        if !entry.direct && entry.required_by.is_empty() {
            tracing::debug!(name = %name, "pruning orphaned dependency");
            let requires = entry.requires.clone();
            release(resolution, name, &requires);
        } else {
            resolution.insert(name.clone(), entry);
        }
    }
}
