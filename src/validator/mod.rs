//! Validation of graft.yaml, graft.lock and the checkouts on disk
//!
//! The three checks are independent and each produces its own report:
//! - `config`: every semantic problem of the declaration
//! - `lock`: lock schema, declared-vs-locked drift and remote refs
//! - `integrity`: checkouts against the commits the lock records
//!
//! Problems carry a typed [`ValidationKind`]; nothing downstream inspects
//! message text. Integrity mismatches get their own exit code (2).


use std::fmt;

use crate::config::graft::GraftConfig;
use crate::config::lockfile::{LockFile, is_commit_hash};
use crate::error::{GraftError, Result};
use crate::operations::OperationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// What kind of problem was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Schema,
    RefNotFound,
    RefMoved,
    IntegrityMismatch,
    General,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationKind::Schema => "schema",
            ValidationKind::RefNotFound => "ref_not_found",
            ValidationKind::RefMoved => "ref_moved",
            ValidationKind::IntegrityMismatch => "integrity_mismatch",
            ValidationKind::General => "general",
        };
        f.write_str(label)
    }
}

/// One problem found by a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub severity: Severity,
    pub kind: ValidationKind,

    /// Dependency the problem is about, if any
    pub dependency: Option<String>,
}

impl ValidationError {
    fn error(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            kind,
            dependency: None,
        }
    }

    fn warning(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, message)
        }
    }

    fn about(self, name: &str) -> Self {
        Self {
            dependency: Some(name.to_string()),
            ..self
        }
    }
}

impl From<&GraftError> for ValidationError {
    fn from(err: &GraftError) -> Self {
        let kind = match err {
            GraftError::Schema { .. } => ValidationKind::Schema,
            GraftError::IntegrityMismatch { .. } => ValidationKind::IntegrityMismatch,
            _ => ValidationKind::General,
        };
        Self::error(kind, err.to_string())
    }
}

/// Which check a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Config,
    Lock,
    Integrity,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Check::Config => "config",
            Check::Lock => "lock",
            Check::Integrity => "integrity",
        };
        f.write_str(label)
    }
}

/// Everything one check found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub check: Check,
    pub problems: Vec<ValidationError>,
}

impl ValidationReport {
    fn new(check: Check) -> Self {
        Self {
            check,
            problems: Vec::new(),
        }
    }

    fn push(&mut self, problem: ValidationError) {
        self.problems.push(problem);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.problems
            .iter()
            .filter(|p| p.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.problems
            .iter()
            .filter(|p| p.severity == Severity::Warning)
    }

    /// 2 for integrity mismatches, 1 for any other error, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        if self
            .problems
            .iter()
            .any(|p| p.kind == ValidationKind::IntegrityMismatch)
        {
            2
        } else if self.errors().next().is_some() {
            1
        } else {
            0
        }
    }
}

/// Highest exit code among `reports`
pub fn exit_code(reports: &[ValidationReport]) -> i32 {
    reports
        .iter()
        .map(ValidationReport::exit_code)
        .max()
        .unwrap_or(0)
}

/// Runs the checks against one workspace
pub struct Validator<'c, 'a> {
    ctx: &'c OperationContext<'a>,
}

impl<'c, 'a> Validator<'c, 'a> {
    pub fn new(ctx: &'c OperationContext<'a>) -> Self {
        Self { ctx }
    }

    /// Run one check
    pub fn run(&self, check: Check) -> ValidationReport {
        match check {
            Check::Config => self.config(),
            Check::Lock => self.lock(),
            Check::Integrity => self.integrity(),
        }
    }

    /// Run every check
    pub fn all(&self) -> Vec<ValidationReport> {
        vec![self.config(), self.lock(), self.integrity()]
    }

    /// Declaration schema and references
    pub fn config(&self) -> ValidationReport {
        let mut report = ValidationReport::new(Check::Config);

        let config = match self.read_config() {
            Ok(config) => config,
            Err(e) => {
                report.push(ValidationError::from(&e));
                return report;
            }
        };

        for problem in config.problems() {
            report.push(ValidationError::error(ValidationKind::Schema, problem));
        }
        if config.deps.is_empty() {
            report.push(ValidationError::error(
                ValidationKind::Schema,
                "no dependencies declared",
            ));
        }

        tracing::debug!(problems = report.problems.len(), "config check done");
        report
    }

    /// Lock schema, drift from the declaration and remote refs
    pub fn lock(&self) -> ValidationReport {
        let mut report = ValidationReport::new(Check::Lock);

        let lockfile = match self.read_lock() {
            Ok(lockfile) => lockfile,
            Err(problems) => {
                report.problems = problems;
                return report;
            }
        };

        // Config problems belong to the config check.
        if let Ok(config) = self.read_config() {
            check_declared(&config, &lockfile, &mut report);
        }

        for (name, entry) in lockfile.ordered() {
            if is_commit_hash(&entry.git_ref) {
                continue;
            }
            match self.ctx.git.ls_remote(&entry.source, &entry.git_ref) {
                Ok(None) => report.push(
                    ValidationError::warning(
                        ValidationKind::RefNotFound,
                        format!("{name}: ref '{}' not found on {}", entry.git_ref, entry.source),
                    )
                    .about(name),
                ),
                Ok(Some(remote)) if !remote.eq_ignore_ascii_case(&entry.commit) => report.push(
                    ValidationError::warning(
                        ValidationKind::RefMoved,
                        format!(
                            "{name}: ref '{}' moved from {} to {}",
                            entry.git_ref,
                            entry.short_commit(),
                            remote.get(..10).unwrap_or(&remote)
                        ),
                    )
                    .about(name),
                ),
                Ok(Some(_)) => {}
                Err(e) => report.push(
                    ValidationError::warning(
                        ValidationKind::General,
                        format!("{name}: could not query remote: {e}"),
                    )
                    .about(name),
                ),
            }
        }

        tracing::debug!(problems = report.problems.len(), "lock check done");
        report
    }

    /// Checkouts against the commits the lock records
    pub fn integrity(&self) -> ValidationReport {
        let mut report = ValidationReport::new(Check::Integrity);

        let lockfile = match self.read_lock() {
            Ok(lockfile) => lockfile,
            Err(problems) => {
                report.problems = problems;
                return report;
            }
        };

        for (name, entry) in lockfile.ordered() {
            let dest = self.ctx.workspace.checkout_dir(name);
            if !self.ctx.git.has_checkout(&dest) {
                tracing::debug!(name = %name, "no checkout, skipping");
                continue;
            }

            match self.ctx.git.commit_of(&dest) {
                Ok(actual) if actual.eq_ignore_ascii_case(&entry.commit) => {}
                Ok(actual) => {
                    let mismatch = GraftError::IntegrityMismatch {
                        name: name.clone(),
                        expected: entry.commit.clone(),
                        actual,
                    };
                    report.push(ValidationError::from(&mismatch).about(name));
                }
                Err(e) => report.push(ValidationError::from(&e).about(name)),
            }
        }

        tracing::debug!(problems = report.problems.len(), "integrity check done");
        report
    }

    fn read_config(&self) -> Result<GraftConfig> {
        let path = self.ctx.workspace.config_path();
        let label = path.display().to_string();
        let bytes = self
            .ctx
            .fs
            .read(&path)?
            .ok_or_else(|| crate::error::config::not_found(&label))?;
        GraftConfig::parse(&String::from_utf8_lossy(&bytes), &label)
    }

    /// The lock file, or the problems that make it unusable
    fn read_lock(&self) -> std::result::Result<LockFile, Vec<ValidationError>> {
        let store = self.ctx.lock_store();
        let bytes = match store.read_bytes() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                let missing = GraftError::LockfileMissing {
                    path: store.path().display().to_string(),
                };
                return Err(vec![ValidationError::from(&missing)]);
            }
            Err(e) => return Err(vec![ValidationError::from(&e)]),
        };

        LockFile::check(&String::from_utf8_lossy(&bytes)).map_err(|problems| {
            problems
                .into_iter()
                .map(|p| ValidationError::error(ValidationKind::Schema, p))
                .collect()
        })
    }
}

/// Every declared dependency is locked, at the declared version
fn check_declared(config: &GraftConfig, lockfile: &LockFile, report: &mut ValidationReport) {
    for (name, spec) in &config.deps {
        match lockfile.get(name) {
            None => report.push(
                ValidationError::error(
                    ValidationKind::General,
                    format!("{name}: declared in graft.yaml but missing from graft.lock"),
                )
                .about(name),
            ),
            Some(entry) if !entry.satisfies(spec) => report.push(
                ValidationError::warning(
                    ValidationKind::General,
                    format!(
                        "{name}: graft.yaml declares {} but graft.lock has {}",
                        spec.version(),
                        entry.version()
                    ),
                )
                .about(name),
            ),
            Some(_) => {}
        }
    }
}
