//! Status command implementation

use crate::cli::StatusArgs;
use crate::config::Settings;
use crate::error::{GraftError, Result};
use crate::ui::display;

use super::helpers::Session;

/// Run status command
pub fn run(settings: Settings, args: StatusArgs) -> Result<()> {
    let session = Session::open(settings)?;
    let ctx = session.ctx();

    let lockfile = ctx.lock_store().load_required()?;
    if let Some(name) = args.name.as_deref() {
        if lockfile.get(name).is_none() {
            return Err(GraftError::DependencyNotFound {
                name: name.to_string(),
            });
        }
    }

    let snapshots = ctx.snapshots().list().unwrap_or_else(|e| {
        tracing::warn!("could not list snapshots: {e}");
        Vec::new()
    });

    print!(
        "{}",
        display::status(&lockfile, args.name.as_deref(), &snapshots)
    );
    Ok(())
}
