//! Serialization implementations for `LockFile`
//!
//! Writing always produces the current schema with entries grouped
//! direct-first, alphabetical within each group. Reading accepts both
//! schema generations; v1 entries lack `direct`, `requires` and
//! `required_by` and get `true`, `[]`, `[]`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::lockfile::entry::{LockEntry, is_commit_hash};

/// Serialize the lock file in canonical order
pub fn serialize_lockfile<S>(
    api_version: &str,
    dependencies: &[(&String, &LockEntry)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut state = serializer.serialize_struct("LockFile", 2)?;
    state.serialize_field("apiVersion", api_version)?;
    state.serialize_field("dependencies", &OrderedEntries(dependencies))?;
    state.end()
}

struct OrderedEntries<'a>(&'a [(&'a String, &'a LockEntry)]);

impl Serialize for OrderedEntries<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Lock file as found on disk, either schema generation
#[derive(Debug, Deserialize)]
pub(crate) struct RawLockFile {
    #[serde(rename = "apiVersion", default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, RawLockEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLockEntry {
    #[serde(default)]
    source: Option<String>,
    #[serde(rename = "ref", default)]
    git_ref: Option<String>,
    #[serde(default)]
    commit: Option<String>,
    #[serde(default)]
    consumed_at: Option<String>,
    #[serde(default)]
    direct: Option<bool>,
    #[serde(default)]
    requires: Option<Vec<String>>,
    #[serde(default)]
    required_by: Option<Vec<String>>,
}

fn required(name: &str, field: &str, value: Option<String>) -> std::result::Result<String, String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("dependency '{name}' is missing required field '{field}'")),
    }
}

impl RawLockEntry {
    /// Validate into an entry, defaulting the v2-only fields
    pub fn into_entry(self, name: &str) -> std::result::Result<LockEntry, String> {
        let source = required(name, "source", self.source)?;
        let git_ref = required(name, "ref", self.git_ref)?;
        let commit = required(name, "commit", self.commit)?;
        let consumed_at = required(name, "consumed_at", self.consumed_at)?;

        if !is_commit_hash(&commit) {
            return Err(format!(
                "dependency '{name}' has commit '{commit}' which is not 40 hex characters"
            ));
        }

        let consumed_at = DateTime::parse_from_rfc3339(&consumed_at)
            .map_err(|e| {
                format!("dependency '{name}' has invalid consumed_at '{consumed_at}': {e}")
            })?
            .with_timezone(&Utc);

        let entry = LockEntry {
            source,
            git_ref,
            commit,
            consumed_at,
            direct: self.direct.unwrap_or(true),
            requires: Vec::new(),
            required_by: Vec::new(),
        };
        let entry = entry.with_requires(self.requires.unwrap_or_default());
        Ok(self
            .required_by
            .unwrap_or_default()
            .iter()
            .fold(entry, |entry, parent| entry.with_dependent(parent)))
    }
}
