//! Upgrade command implementation

use crate::cli::UpgradeArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::operations::upgrade::UpgradePhase;
use crate::operations::{UpgradeOperation, UpgradeOptions};
use crate::ui::display;

use super::helpers::Session;

/// Run upgrade command
pub fn run(settings: Settings, args: UpgradeArgs) -> Result<()> {
    let session = Session::open(settings)?;
    let options = UpgradeOptions {
        skip_migration: args.skip_migration,
        skip_verify: args.skip_verify,
        dry_run: args.dry_run,
        keep_snapshot: args.keep_snapshot,
    };

    // A dry run only reads, so it does not wait for other invocations.
    let _guard = if options.dry_run {
        None
    } else {
        Some(session.workspace.lock()?)
    };

    let ctx = session.ctx();
    let mut operation = UpgradeOperation::new(&ctx, options);
    let outcome = operation.execute(&args.name, &args.to).inspect_err(|_| {
        if operation.phase() == UpgradePhase::RolledBack {
            eprintln!("Upgrade of {} rolled back; graft.lock is unchanged", args.name);
        }
    })?;

    print!("{}", display::upgrade_summary(&outcome));
    Ok(())
}
