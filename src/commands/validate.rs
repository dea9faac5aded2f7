//! Validate command implementation

use crate::cli::{ValidateArgs, ValidateScope};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::display;
use crate::validator::{self, Check, Validator};

use super::helpers::Session;

/// Run validate command, returning the process exit code
pub fn run(settings: Settings, args: ValidateArgs) -> Result<i32> {
    let session = Session::open(settings)?;
    let ctx = session.ctx();
    let checks = Validator::new(&ctx);

    let reports = match args.check {
        ValidateScope::Config => vec![checks.run(Check::Config)],
        ValidateScope::Lock => vec![checks.run(Check::Lock)],
        ValidateScope::Integrity => vec![checks.run(Check::Integrity)],
        ValidateScope::All => checks.all(),
    };

    print!("{}", display::validation(&reports));
    Ok(validator::exit_code(&reports))
}
