//! `extconf generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use extconf::binding::ProcessDriver;
use extconf::ops::{generate, GenerateOptions};

pub fn execute(args: GenerateArgs) -> Result<()> {
    let driver = ProcessDriver::locate(args.cfc)?;

    let opts = GenerateOptions {
        dest: args.dest,
        source_dirs: args.source_dirs,
        include_dirs: args.include_dirs,
        header: args.header,
        footer: args.footer,
        modified: args.modified,
    };
    generate(&opts, &driver)?;

    eprintln!("   Generated {}", opts.dest.display());
    Ok(())
}
