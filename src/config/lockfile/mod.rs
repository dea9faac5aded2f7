//! Lock file (graft.lock) main module
//!
//! The lock file records the exact commit every dependency resolved to.
//! It is fully regenerated on every write; comments and formatting are
//! not preserved.

pub mod entry;
pub mod serialization;
pub mod store;


use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::graft::API_VERSION;
use crate::config::lockfile::serialization::{RawLockFile, serialize_lockfile};
use crate::error::{self, Result};

pub use entry::{LockEntry, is_commit_hash};
pub use store::LockStore;

/// Lock file name
pub const LOCKFILE_NAME: &str = "graft.lock";

/// Lock file structure (graft.lock)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFile {
    pub api_version: String,

    /// Resolved dependencies by name
    pub dependencies: BTreeMap<String, LockEntry>,
}

impl Default for LockFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for LockFile {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_lockfile(&self.api_version, &self.ordered(), serializer)
    }
}

impl LockFile {
    pub fn new() -> Self {
        Self::from_entries(BTreeMap::new())
    }

    pub fn from_entries(dependencies: BTreeMap<String, LockEntry>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            dependencies,
        }
    }

    /// Parse, collecting every schema problem instead of stopping at the first
    pub fn check(yaml: &str) -> std::result::Result<Self, Vec<String>> {
        let raw: Option<RawLockFile> =
            serde_yaml::from_str(yaml).map_err(|e| vec![e.to_string()])?;
        let Some(raw) = raw else {
            return Ok(Self::new());
        };

        let mut problems = Vec::new();
        let mut dependencies = BTreeMap::new();
        for (name, raw_entry) in raw.dependencies.unwrap_or_default() {
            match raw_entry.into_entry(&name) {
                Ok(entry) => {
                    dependencies.insert(name, entry);
                }
                Err(problem) => problems.push(problem),
            }
        }

        if !problems.is_empty() {
            return Err(problems);
        }

        Ok(Self {
            api_version: raw.api_version.unwrap_or_else(|| API_VERSION.to_string()),
            dependencies,
        })
    }

    /// Parse a lock file of either schema generation
    pub fn from_yaml(yaml: &str, path: &str) -> Result<Self> {
        Self::check(yaml).map_err(|problems| error::schema(path, problems.join("; ")))
    }

    /// Serialize in canonical order (always the current schema)
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| error::schema(LOCKFILE_NAME, format!("failed to serialize: {e}")))
    }

    /// Entries grouped direct-first, alphabetical within each group
    pub fn ordered(&self) -> Vec<(&String, &LockEntry)> {
        let mut entries: Vec<_> = self.dependencies.iter().collect();
        entries.sort_by(|(a_name, a), (b_name, b)| {
            b.direct.cmp(&a.direct).then_with(|| a_name.cmp(b_name))
        });
        entries
    }

    pub fn get(&self, name: &str) -> Option<&LockEntry> {
        self.dependencies.get(name)
    }
}
