//! `extconf flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use extconf::ops::ConfigurePlan;

pub fn execute(args: FlagsArgs) -> Result<()> {
    let opts = super::configure_options(&args.layout, None)?;
    let plan = ConfigurePlan::resolve(&opts)?;
    let flags = plan.flags();

    if args.roles {
        println!("# Include flags for `{}`:", plan.spec.target());
        for include in flags.includes() {
            println!("  {}    # from: {}", include.flag, include.role);
        }
    } else {
        println!("{}", flags);
    }

    Ok(())
}
