//! Graph checks for the resolver
//!
//! This module provides:
//! - Circular dependency detection, per queue item and over a whole resolution
//! - Lineage of an already resolved entry (for incremental resolution)

use std::collections::BTreeSet;

use crate::config::lockfile::LockEntry;
use crate::error::{GraftError, Result};

use super::Resolution;

/// Check for circular dependency in resolution stack
///
/// # Errors
///
/// Returns `GraftError::Cycle` if `name` is one of its own ancestors.
pub fn check_cycle(name: &str, ancestry: &[String]) -> Result<()> {
    let Some(start) = ancestry.iter().position(|n| n == name) else {
        return Ok(());
    };
    let mut chain = ancestry[start..].to_vec();
    chain.push(name.to_string());
    Err(GraftError::Cycle {
        chain: chain.join(" -> "),
    })
}

/// Check the `requires` graph of a whole resolution for cycles
///
/// Names are visited in sorted order, so the reported chain does not
/// depend on the order dependencies were discovered in.
///
/// # Errors
///
/// Returns `GraftError::Cycle` naming the first cycle found.
pub fn check_graph(resolution: &Resolution) -> Result<()> {
    let mut done = BTreeSet::new();
    let mut path = Vec::new();
    for name in resolution.keys() {
        visit(resolution, name, &mut path, &mut done)?;
    }
    Ok(())
}

fn visit<'r>(
    resolution: &'r Resolution,
    name: &'r str,
    path: &mut Vec<&'r str>,
    done: &mut BTreeSet<&'r str>,
) -> Result<()> {
    if let Some(start) = path.iter().position(|n| *n == name) {
        let mut chain = path[start..].to_vec();
        chain.push(name);
        return Err(GraftError::Cycle {
            chain: chain.join(" -> "),
        });
    }
    if done.contains(name) {
        return Ok(());
    }
    let Some(entry) = resolution.get(name) else {
        return Ok(());
    };

    path.push(name);
    for dep in &entry.requires {
        visit(resolution, dep, path, done)?;
    }
    path.pop();
    done.insert(name);
    Ok(())
}

/// Path from a direct dependency down to `name`, following the first dependent
pub fn lineage(resolution: &Resolution, name: &str) -> Vec<String> {
    let mut chain = vec![name.to_string()];
    let mut current = resolution.get(name);

    while let Some(parent) = current.and_then(first_dependent) {
        if chain.iter().any(|n| n == parent) {
            break;
        }
        chain.push(parent.to_string());
        current = resolution.get(parent);
    }

    chain.reverse();
    chain
}

fn first_dependent(entry: &LockEntry) -> Option<&str> {
    if entry.direct {
        return None;
    }
    entry.required_by.first().map(String::as_str)
}
