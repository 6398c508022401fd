//! `extconf check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use extconf::ops::{check, format_report};

pub fn execute(args: CheckArgs) -> Result<()> {
    let opts = super::configure_options(&args.layout, None)?;
    let report = check(&opts)?;

    print!("{}", format_report(&report));

    if !report.is_ok() {
        bail!(
            "{} problem(s) found for `{}`",
            report.findings.len(),
            report.target
        );
    }

    Ok(())
}
