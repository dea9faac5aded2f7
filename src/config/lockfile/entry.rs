//! `LockEntry` struct for the lock file
//!
//! A resolved dependency. Entries are value objects: every update returns
//! a new entry instead of mutating in place.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::config::graft::DependencySpec;

/// Label used when the requirer is the top-level declaration
pub const ROOT_REQUIRER: &str = "graft.yaml";

/// A resolved dependency in the lock file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockEntry {
    /// Repository URL
    pub source: String,

    /// Ref as declared (branch, tag, or commit)
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Resolved commit (40 hex characters)
    pub commit: String,

    /// Refreshed on every successful resolution
    #[serde(serialize_with = "serialize_timestamp")]
    pub consumed_at: DateTime<Utc>,

    /// Declared in the top-level graft.yaml
    pub direct: bool,

    /// Names this entry's own declaration lists (sorted)
    pub requires: Vec<String>,

    /// Names of entries that pulled this one in (sorted)
    pub required_by: Vec<String>,
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(ts))
}

/// RFC 3339, UTC, with only as many fractional digits as needed
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Exactly 40 hex characters
pub fn is_commit_hash(value: &str) -> bool {
    value.len() == 40 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn insert_sorted(list: &[String], name: &str) -> Vec<String> {
    let mut list = list.to_vec();
    if let Err(pos) = list.binary_search_by(|n| n.as_str().cmp(name)) {
        list.insert(pos, name.to_string());
    }
    list
}

impl LockEntry {
    /// New entry for a freshly resolved dependency
    pub fn new(
        spec: &DependencySpec,
        commit: impl Into<String>,
        consumed_at: DateTime<Utc>,
        direct: bool,
    ) -> Self {
        Self {
            source: spec.source.clone(),
            git_ref: spec.git_ref.clone(),
            commit: commit.into(),
            consumed_at,
            direct,
            requires: Vec::new(),
            required_by: Vec::new(),
        }
    }

    pub fn with_requires<I, S>(self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requires: Vec<String> = requires.into_iter().map(Into::into).collect();
        requires.sort();
        requires.dedup();
        Self { requires, ..self }
    }

    /// Record another dependent; idempotent
    pub fn with_dependent(self, parent: &str) -> Self {
        let required_by = insert_sorted(&self.required_by, parent);
        Self {
            required_by,
            ..self
        }
    }

    pub fn without_dependent(self, parent: &str) -> Self {
        let required_by = self
            .required_by
            .iter()
            .filter(|n| n.as_str() != parent)
            .cloned()
            .collect();
        Self {
            required_by,
            ..self
        }
    }

    pub fn with_direct(self, direct: bool) -> Self {
        Self { direct, ..self }
    }

    /// Same entry pinned to another ref/commit
    pub fn with_version(
        self,
        git_ref: impl Into<String>,
        commit: impl Into<String>,
        consumed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            git_ref: git_ref.into(),
            commit: commit.into(),
            consumed_at,
            ..self
        }
    }

    #[cfg(test)]
    pub fn with_consumed_at(self, consumed_at: DateTime<Utc>) -> Self {
        Self {
            consumed_at,
            ..self
        }
    }

    /// `source#ref`
    pub fn version(&self) -> String {
        format!("{}#{}", self.source, self.git_ref)
    }

    /// Whether a declaration asks for exactly this source and ref
    pub fn satisfies(&self, spec: &DependencySpec) -> bool {
        self.source == spec.source && self.git_ref == spec.git_ref
    }

    /// Declaration spec equivalent to this entry
    pub fn spec(&self, name: &str) -> DependencySpec {
        DependencySpec::new(name, self.source.clone(), self.git_ref.clone())
    }

    /// Whoever first required this entry, for conflict reports
    pub fn requirer(&self) -> &str {
        if self.direct {
            return ROOT_REQUIRER;
        }
        self.required_by
            .first()
            .map_or(ROOT_REQUIRER, String::as_str)
    }

    /// First 10 characters of the commit for display
    pub fn short_commit(&self) -> &str {
        self.commit.get(..10).unwrap_or(&self.commit)
    }
}
