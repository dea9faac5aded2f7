//! Dependency declaration (graft.yaml) main module
//!
//! Parsing is split in two layers: a structural parse that only fails on
//! malformed YAML or wrong types, and [`GraftConfig::problems`] which
//! reports every semantic problem at once. [`GraftConfig::from_yaml`]
//! combines both and fails fast.

pub mod change;
pub mod command;
pub mod dependency;
mod serialization;

use std::collections::BTreeMap;

use crate::error::{self, Result};
use serialization::RawGraftConfig;

pub use change::{Change, ChangeType};
pub use command::Command;
pub use dependency::DependencySpec;

/// Declaration file name
pub const CONFIG_FILE: &str = "graft.yaml";

/// The only apiVersion this release understands
pub const API_VERSION: &str = "graft/v0";

/// Parsed graft.yaml; immutable once constructed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraftConfig {
    pub api_version: String,
    pub metadata: BTreeMap<String, serde_yaml::Value>,
    pub deps: BTreeMap<String, DependencySpec>,
    pub changes: BTreeMap<String, Change>,
    pub commands: BTreeMap<String, Command>,
}

impl GraftConfig {
    /// Structural parse only; see [`GraftConfig::problems`]
    pub fn parse(yaml: &str, path: &str) -> Result<Self> {
        let raw: Option<RawGraftConfig> =
            serde_yaml::from_str(yaml).map_err(|e| error::schema(path, e.to_string()))?;
        let Some(raw) = raw else {
            return Err(error::schema(path, "file is empty"));
        };

        Ok(Self {
            api_version: raw.api_version.unwrap_or_default(),
            metadata: raw.metadata.unwrap_or_default(),
            deps: raw
                .deps
                .unwrap_or_default()
                .into_iter()
                .map(|(name, dep)| {
                    let spec = DependencySpec::from_raw(&name, dep);
                    (name, spec)
                })
                .collect(),
            changes: raw
                .changes
                .unwrap_or_default()
                .into_iter()
                .map(|(git_ref, change)| {
                    let change = Change::from_raw(&git_ref, change);
                    (git_ref, change)
                })
                .collect(),
            commands: raw
                .commands
                .unwrap_or_default()
                .into_iter()
                .map(|(name, command)| {
                    let command = Command::from_raw(&name, command);
                    (name, command)
                })
                .collect(),
        })
    }

    /// Parse and fail on the first semantic problem
    pub fn from_yaml(yaml: &str, path: &str) -> Result<Self> {
        let config = Self::parse(yaml, path)?;
        if let Some(problem) = config.problems().into_iter().next() {
            return Err(error::schema(path, problem));
        }
        Ok(config)
    }

    /// Every semantic problem in this declaration
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.api_version.is_empty() {
            problems.push("apiVersion is required".to_string());
        } else if self.api_version != API_VERSION {
            problems.push(format!(
                "unsupported apiVersion '{}' (expected '{API_VERSION}')",
                self.api_version
            ));
        }

        for spec in self.deps.values() {
            problems.extend(spec.problems());
        }

        for command in self.commands.values() {
            problems.extend(command.problems());
        }

        for change in self.changes.values() {
            for (role, name) in change.command_refs() {
                if !self.commands.contains_key(name) {
                    problems.push(format!(
                        "change '{}' references undeclared {role} command '{name}'",
                        change.git_ref
                    ));
                }
            }
        }

        problems
    }

    pub fn find_change(&self, git_ref: &str) -> Option<&Change> {
        self.changes.get(git_ref)
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }
}
