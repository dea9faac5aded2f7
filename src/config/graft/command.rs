//! `Command` declarations for graft.yaml

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// A named shell command that a change can reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,

    /// Shell invocation string
    pub run: String,

    pub description: Option<String>,

    /// Relative to the repository that runs the command
    pub working_dir: Option<String>,

    /// Merged over the inherited environment
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawCommand {
    run: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    working_dir: Option<String>,
    #[serde(default)]
    env: Option<BTreeMap<String, String>>,
}

impl Command {
    pub(crate) fn from_raw(name: &str, raw: RawCommand) -> Self {
        Self {
            name: name.to_string(),
            run: raw.run,
            description: raw.description,
            working_dir: raw.working_dir,
            env: raw.env.unwrap_or_default(),
        }
    }

    /// Problems with this declaration, empty when valid
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.run.trim().is_empty() {
            problems.push(format!("command '{}' has an empty 'run'", self.name));
        }
        if let Some(dir) = &self.working_dir {
            let path = Path::new(dir);
            if path.is_absolute() || dir.starts_with('/') || dir.starts_with('\\') {
                problems.push(format!(
                    "command '{}' working_dir '{dir}' must be relative",
                    self.name
                ));
            } else if path.components().any(|c| matches!(c, Component::ParentDir)) {
                problems.push(format!(
                    "command '{}' working_dir '{dir}' cannot leave the repository",
                    self.name
                ));
            }
        }
        problems
    }

    /// Directory the command runs in, under the invoking repository root
    pub fn resolve_working_dir(&self, repo_root: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) => repo_root.join(dir),
            None => repo_root.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(working_dir: Option<&str>) -> Command {
        Command {
            name: "migrate".to_string(),
            run: "./migrate.sh".to_string(),
            description: None,
            working_dir: working_dir.map(str::to_string),
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn test_relative_working_dir_is_valid() {
        assert!(command(Some("scripts/migrations")).problems().is_empty());
        assert!(command(None).problems().is_empty());
    }

    #[test]
    fn test_absolute_working_dir_is_rejected() {
        let problems = command(Some("/etc")).problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("must be relative"));
    }

    #[test]
    fn test_parent_working_dir_is_rejected() {
        let problems = command(Some("scripts/../../outside")).problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("cannot leave"));
    }

    #[test]
    fn test_working_dir_resolves_against_repo_root() {
        let root = Path::new("/work/repo");
        assert_eq!(
            command(Some("scripts")).resolve_working_dir(root),
            PathBuf::from("/work/repo/scripts")
        );
        assert_eq!(command(None).resolve_working_dir(root), root.to_path_buf());
    }
}
