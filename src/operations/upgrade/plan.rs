//! Looking up the declared change for an upgrade target

use crate::config::graft::{Change, Command, GraftConfig};

use super::UpgradeOptions;

/// Which declaration a change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The dependency's own graft.yaml
    Dependency,

    /// The workspace's graft.yaml
    Workspace,
}

/// A change with its commands resolved in the declaration that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub change: Change,
    pub origin: ChangeOrigin,
    pub migration: Option<Command>,
    pub verify: Option<Command>,
}

impl PlannedChange {
    fn from_declaration(change: &Change, config: &GraftConfig, origin: ChangeOrigin) -> Self {
        let lookup = |name: &Option<String>| {
            name.as_deref()
                .and_then(|n| config.command(n))
                .cloned()
        };
        Self {
            change: change.clone(),
            origin,
            migration: lookup(&change.migration),
            verify: lookup(&change.verify),
        }
    }

    /// Commands an upgrade with `options` runs, in order
    pub fn command_names(&self, options: UpgradeOptions) -> Vec<String> {
        let migration = self.migration.as_ref().filter(|_| !options.skip_migration);
        let verify = self.verify.as_ref().filter(|_| !options.skip_verify);
        migration
            .into_iter()
            .chain(verify)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// The change declared for `to_ref`, preferring the dependency's declaration
pub fn find_change(
    to_ref: &str,
    dependency: Option<&GraftConfig>,
    workspace: &GraftConfig,
) -> Option<PlannedChange> {
    let from_dependency = dependency.and_then(|config| {
        config
            .find_change(to_ref)
            .map(|change| PlannedChange::from_declaration(change, config, ChangeOrigin::Dependency))
    });

    from_dependency.or_else(|| {
        workspace
            .find_change(to_ref)
            .map(|change| PlannedChange::from_declaration(change, workspace, ChangeOrigin::Workspace))
    })
}
