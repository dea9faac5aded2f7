//! Command helper utilities

use crate::common::fs::LocalFs;
use crate::config::Settings;
use crate::error::Result;
use crate::exec::ShellExecutor;
use crate::git::SystemGit;
use crate::operations::OperationContext;
use crate::workspace::Workspace;

/// A workspace opened from the command line with production capabilities
pub struct Session {
    pub workspace: Workspace,
    pub settings: Settings,
    git: SystemGit,
    fs: LocalFs,
    executor: ShellExecutor,
}

impl Session {
    /// Open the workspace named by `--workspace`, or the one around the
    /// current directory
    pub fn open(settings: Settings) -> Result<Self> {
        let workspace = Workspace::discover(settings.workspace.as_deref())?;
        Ok(Self {
            workspace,
            git: SystemGit::new(settings.timeouts),
            fs: LocalFs,
            executor: ShellExecutor,
            settings,
        })
    }

    pub fn ctx(&self) -> OperationContext<'_> {
        OperationContext::new(&self.workspace, &self.git, &self.fs, &self.executor)
            .with_timeouts(self.settings.timeouts)
            .with_progress(!self.settings.verbose)
    }
}
