//! Apply command implementation

use crate::cli::ApplyArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::operations::apply::apply;
use crate::ui::display;

use super::helpers::Session;

/// Run apply command
pub fn run(settings: Settings, args: ApplyArgs) -> Result<()> {
    let session = Session::open(settings)?;
    let _guard = session.workspace.lock()?;

    let outcome = apply(&session.ctx(), &args.name, &args.to)?;
    print!("{}", display::apply_summary(&outcome));
    Ok(())
}
