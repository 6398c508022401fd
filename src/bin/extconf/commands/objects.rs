//! `extconf objects` command

use anyhow::Result;

use crate::cli::ObjectsArgs;
use extconf::ops::ConfigurePlan;

pub fn execute(args: ObjectsArgs) -> Result<()> {
    let opts = super::configure_options(&args.layout, None)?;
    let plan = ConfigurePlan::resolve(&opts)?;
    let manifest = plan.discover()?;

    for entry in manifest.entries(&plan.invocation_dir) {
        println!("{}", entry);
    }

    Ok(())
}
