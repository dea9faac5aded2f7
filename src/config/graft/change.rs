//! `Change` declarations for graft.yaml
//!
//! A change is keyed by the ref that introduces it and may name a
//! migration and a verification command.

use std::fmt;

use serde::Deserialize;

/// Kind of change a ref introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Breaking,
    Feature,
    Fix,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeType::Breaking => "breaking",
            ChangeType::Feature => "feature",
            ChangeType::Fix => "fix",
        };
        f.write_str(label)
    }
}

/// A change introduced at a specific ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Ref that introduces this change
    pub git_ref: String,

    pub change_type: ChangeType,

    pub description: String,

    /// Name of the command to run when upgrading to this ref
    pub migration: Option<String>,

    /// Name of the command that confirms the migration succeeded
    pub verify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawChange {
    #[serde(rename = "type")]
    change_type: ChangeType,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    migration: Option<String>,
    #[serde(default)]
    verify: Option<String>,
}

impl Change {
    pub(crate) fn from_raw(git_ref: &str, raw: RawChange) -> Self {
        Self {
            git_ref: git_ref.to_string(),
            change_type: raw.change_type,
            description: raw.description.unwrap_or_default(),
            migration: raw.migration,
            verify: raw.verify,
        }
    }

    /// Command names this change references, labelled by role
    pub fn command_refs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [("migration", &self.migration), ("verify", &self.verify)]
            .into_iter()
            .filter_map(|(role, name)| name.as_deref().map(|n| (role, n)))
    }
}
