//! Resolve command implementation

use crate::config::Settings;
use crate::error::Result;
use crate::operations::resolve::resolve;
use crate::ui::display;

use super::helpers::Session;

/// Run resolve command
pub fn run(settings: Settings) -> Result<()> {
    let session = Session::open(settings)?;
    let _guard = session.workspace.lock()?;

    let outcome = resolve(&session.ctx())?;
    print!("{}", display::resolve_summary(&outcome));
    Ok(())
}
