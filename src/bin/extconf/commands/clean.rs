//! `extconf clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use extconf::builder::BUILD_SCRIPT_NAME;
use extconf::ops::clean;
use extconf::util::fs::absolutize;

pub fn execute(args: CleanArgs) -> Result<()> {
    let cwd = super::invocation_dir()?;
    let path = match args.out {
        Some(out) => absolutize(&cwd, &out),
        None => cwd.join(BUILD_SCRIPT_NAME),
    };

    if clean(&path)? {
        eprintln!("     Removed {}", path.display());
    } else {
        eprintln!("     Nothing to clean");
    }

    Ok(())
}
