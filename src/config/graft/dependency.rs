//! `DependencySpec` for graft.yaml
//!
//! A dependency declaration: `name: "<git-url>#<ref>"` or
//! `name: { source: <git-url>, ref: <ref> }`.

use serde::Deserialize;

/// Ref used when a declaration omits one
pub const DEFAULT_REF: &str = "main";

/// A dependency declaration in graft.yaml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Dependency name (unique within one declaration file)
    pub name: String,

    /// Git repository URL
    pub source: String,

    /// Git ref (branch, tag, or commit)
    pub git_ref: String,
}

/// On-disk forms accepted for a dependency value
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDependency {
    Shorthand(String),
    Detailed {
        source: String,
        #[serde(rename = "ref", default)]
        git_ref: Option<String>,
    },
}

impl DependencySpec {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            git_ref: git_ref.into(),
        }
    }

    /// Parse the `"<git-url>#<ref>"` shorthand, splitting on the last `#`
    pub fn from_shorthand(name: impl Into<String>, value: &str) -> Self {
        match value.rsplit_once('#') {
            Some((source, git_ref)) if !git_ref.is_empty() => Self::new(name, source, git_ref),
            Some((source, _)) => Self::new(name, source, DEFAULT_REF),
            None => Self::new(name, value, DEFAULT_REF),
        }
    }

    pub(crate) fn from_raw(name: &str, raw: RawDependency) -> Self {
        match raw {
            RawDependency::Shorthand(value) => Self::from_shorthand(name, &value),
            RawDependency::Detailed { source, git_ref } => Self::new(
                name,
                source,
                git_ref
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| DEFAULT_REF.to_string()),
            ),
        }
    }

    /// `source#ref`, used in conflict reports and status output
    pub fn version(&self) -> String {
        format!("{}#{}", self.source, self.git_ref)
    }

    /// Same dependency under a different ref
    pub fn at_ref(&self, git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            ..self.clone()
        }
    }

    /// Problems with this declaration, empty when valid
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(problem) = name_problem(&self.name) {
            problems.push(problem);
        }
        if self.source.trim().is_empty() {
            problems.push(format!("dependency '{}' has an empty source", self.name));
        }
        problems
    }
}

/// Dependency names double as checkout directory names under `.graft/`
pub fn name_problem(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("dependency name cannot be empty".to_string());
    }
    if name.starts_with('.') {
        return Some(format!("dependency name '{name}' cannot start with '.'"));
    }
    if name.contains('/') || name.contains('\\') {
        return Some(format!(
            "dependency name '{name}' cannot contain path separators"
        ));
    }
    None
}
