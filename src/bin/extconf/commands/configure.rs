//! `extconf configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use extconf::ops::{configure, ConfigurePlan};

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let opts = super::configure_options(&args.layout, args.out.as_deref())?;

    if args.plan {
        let script = ConfigurePlan::resolve(&opts)?.build_script()?;
        println!("{}", serde_json::to_string_pretty(&script.summary())?);
        return Ok(());
    }

    let outcome = configure(&opts)?;
    if outcome.changed {
        eprintln!(
            "  Configured `{}` ({} objects) -> {}",
            outcome.script.target(),
            outcome.script.objects().len(),
            outcome.path.display()
        );
    } else {
        eprintln!("       Fresh {}", outcome.path.display());
    }

    Ok(())
}
