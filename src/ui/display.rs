//! Display functions for command output
//!
//! Every function renders to a `String` so commands decide where it goes
//! and tests can inspect it. Colors come from `console` and switch off on
//! their own when stdout is not a terminal.

use std::fmt::Write as _;

use console::Style;

use crate::config::lockfile::{LockEntry, LockFile};
use crate::operations::apply::ApplyOutcome;
use crate::operations::resolve::ResolveOutcome;
use crate::operations::upgrade::{ChangeOrigin, UpgradeOutcome};
use crate::snapshot::Snapshot;
use crate::validator::{Severity, ValidationReport};

fn bold() -> Style {
    Style::new().bold()
}

fn name_style() -> Style {
    Style::new().bold().yellow()
}

fn dim() -> Style {
    Style::new().dim()
}

fn short(commit: &str) -> &str {
    commit.get(..10).unwrap_or(commit)
}

/// Summary of a resolve run
pub fn resolve_summary(outcome: &ResolveOutcome) -> String {
    let mut out = String::new();
    let lockfile = &outcome.lockfile;

    for (name, entry) in lockfile.ordered() {
        let marker = if outcome.added.contains(name) {
            Style::new().green().apply_to("+")
        } else if outcome.changed.contains(name) {
            Style::new().yellow().apply_to("~")
        } else {
            Style::new().apply_to(" ")
        };
        let _ = writeln!(
            out,
            "{} {} {} {}",
            marker,
            name_style().apply_to(name),
            entry.git_ref,
            dim().apply_to(entry.short_commit())
        );
    }
    for name in &outcome.removed {
        let _ = writeln!(
            out,
            "{} {}",
            Style::new().red().apply_to("-"),
            name_style().apply_to(name)
        );
    }

    let _ = writeln!(
        out,
        "\n{} {} dependencies locked ({} added, {} changed, {} removed)",
        Style::new().green().bold().apply_to("Resolved"),
        lockfile.dependencies.len(),
        outcome.added.len(),
        outcome.changed.len(),
        outcome.removed.len()
    );
    out
}

/// Summary of an apply run
pub fn apply_summary(outcome: &ApplyOutcome) -> String {
    let mut out = format!(
        "{} {} {} ({}) -> {} ({})\n",
        Style::new().green().bold().apply_to("Applied"),
        name_style().apply_to(&outcome.name),
        outcome.from.git_ref,
        dim().apply_to(outcome.from.short_commit()),
        outcome.to.git_ref,
        dim().apply_to(outcome.to.short_commit())
    );
    for name in &outcome.added {
        let _ = writeln!(out, "  {} {}", Style::new().green().apply_to("+"), name);
    }
    for name in &outcome.removed {
        let _ = writeln!(out, "  {} {}", Style::new().red().apply_to("-"), name);
    }
    out
}

fn entry_block(name: &str, entry: &LockEntry) -> String {
    let kind = if entry.direct { "direct" } else { "transitive" };
    let mut out = format!(
        "  {} {}\n",
        name_style().apply_to(name),
        dim().apply_to(format!("({kind})"))
    );
    let _ = writeln!(out, "    {} {}", bold().apply_to("source:"), entry.source);
    let _ = writeln!(out, "    {} {}", bold().apply_to("ref:"), entry.git_ref);
    let _ = writeln!(out, "    {} {}", bold().apply_to("commit:"), entry.short_commit());
    let _ = writeln!(
        out,
        "    {} {}",
        bold().apply_to("consumed:"),
        entry.consumed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if !entry.requires.is_empty() {
        let _ = writeln!(
            out,
            "    {} {}",
            bold().apply_to("requires:"),
            entry.requires.join(", ")
        );
    }
    if !entry.required_by.is_empty() {
        let _ = writeln!(
            out,
            "    {} {}",
            bold().apply_to("required by:"),
            entry.required_by.join(", ")
        );
    }
    out
}

/// Locked dependencies, optionally only `only`, followed by retained snapshots
pub fn status(lockfile: &LockFile, only: Option<&str>, snapshots: &[Snapshot]) -> String {
    let entries: Vec<_> = lockfile
        .ordered()
        .into_iter()
        .filter(|(name, _)| only.is_none_or(|o| o == name.as_str()))
        .collect();

    if entries.is_empty() {
        return "No dependencies locked.\n".to_string();
    }

    let mut out = format!(
        "{}\n",
        bold().apply_to(format!("Locked dependencies ({}):", entries.len()))
    );
    for (name, entry) in entries {
        out.push_str(&entry_block(name, entry));
    }

    if only.is_none() && !snapshots.is_empty() {
        let _ = writeln!(
            out,
            "\n{}",
            bold().apply_to(format!("Snapshots ({}):", snapshots.len()))
        );
        for snapshot in snapshots {
            let _ = writeln!(
                out,
                "  {} {} {}",
                snapshot.id,
                dim().apply_to(&snapshot.operation),
                dim().apply_to(snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC"))
            );
        }
    }
    out
}

/// Result of an upgrade, or its plan for a dry run
pub fn upgrade_summary(outcome: &UpgradeOutcome) -> String {
    let mut out = String::new();
    if outcome.dry_run {
        let _ = writeln!(
            out,
            "{} Would upgrade {}",
            Style::new().cyan().bold().apply_to("[DRY RUN]"),
            name_style().apply_to(&outcome.name)
        );
    } else {
        let _ = writeln!(
            out,
            "{} {}",
            Style::new().green().bold().apply_to("Upgraded"),
            name_style().apply_to(&outcome.name)
        );
    }

    let _ = writeln!(
        out,
        "  {} {} ({}) -> {} ({})",
        bold().apply_to("ref:"),
        outcome.from_ref,
        dim().apply_to(short(&outcome.from_commit)),
        outcome.to_ref,
        dim().apply_to(short(&outcome.to_commit))
    );

    match &outcome.change {
        Some(planned) => {
            let origin = match planned.origin {
                ChangeOrigin::Dependency => "dependency",
                ChangeOrigin::Workspace => "workspace",
            };
            let _ = writeln!(
                out,
                "  {} {} {}",
                bold().apply_to("change:"),
                planned.change.change_type,
                dim().apply_to(format!("(declared by {origin})"))
            );
            if !planned.change.description.is_empty() {
                let _ = writeln!(out, "    {}", planned.change.description);
            }
        }
        None => {
            let _ = writeln!(
                out,
                "  {} {}",
                bold().apply_to("change:"),
                dim().apply_to("none declared")
            );
        }
    }

    let verb = if outcome.dry_run { "would run:" } else { "ran:" };
    if outcome.commands.is_empty() {
        let _ = writeln!(out, "  {} {}", bold().apply_to(verb), dim().apply_to("nothing"));
    } else {
        let _ = writeln!(out, "  {} {}", bold().apply_to(verb), outcome.commands.join(", "));
    }

    if let Some(id) = &outcome.snapshot_id {
        let _ = writeln!(out, "  {} {}", bold().apply_to("snapshot kept:"), id);
    }
    out
}

/// Problems found by each check and a one-line verdict
pub fn validation(reports: &[ValidationReport]) -> String {
    let mut out = String::new();
    let mut errors = 0;
    let mut warnings = 0;

    for report in reports {
        let status = if report.errors().next().is_some() {
            Style::new().red().bold().apply_to("FAIL")
        } else if report.warnings().next().is_some() {
            Style::new().yellow().bold().apply_to("WARN")
        } else {
            Style::new().green().bold().apply_to("OK")
        };
        let _ = writeln!(out, "{} {}", status, bold().apply_to(report.check));

        for problem in &report.problems {
            let label = match problem.severity {
                Severity::Error => {
                    errors += 1;
                    Style::new().red().apply_to("error")
                }
                Severity::Warning => {
                    warnings += 1;
                    Style::new().yellow().apply_to("warning")
                }
            };
            let _ = writeln!(
                out,
                "  {}[{}]: {}",
                label,
                problem.kind,
                problem.message
            );
        }
    }

    let _ = writeln!(out, "\n{errors} error(s), {warnings} warning(s)");
    out
}
