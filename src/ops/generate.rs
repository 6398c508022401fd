//! Implementation of `extconf generate`.
//!
//! Runs the binding compiler over a set of declaration directories.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::binding::{CompilerDriver, CoreBinding, Hierarchy};
use crate::util::fs::read_to_string;

/// Options for generating bindings.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Output directory for generated files
    pub dest: PathBuf,
    pub source_dirs: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    /// File whose text is prepended to every generated file
    pub header: Option<PathBuf>,
    /// File whose text is appended to every generated file
    pub footer: Option<PathBuf>,
    /// Write every file, changed or not
    pub modified: bool,
}

/// Build the hierarchy and write the core binding.
pub fn generate(opts: &GenerateOptions, driver: &dyn CompilerDriver) -> Result<()> {
    let mut hierarchy = Hierarchy::new(&opts.dest);
    for dir in &opts.source_dirs {
        hierarchy.add_source_dir(dir);
    }
    for dir in &opts.include_dirs {
        hierarchy.add_include_dir(dir);
    }
    hierarchy.build(driver)?;

    let header = read_optional(opts.header.as_deref())?;
    let footer = read_optional(opts.footer.as_deref())?;

    let core = CoreBinding::new(&hierarchy, header, footer);
    core.write_all_modified(opts.modified, driver)?;

    tracing::info!("bindings written to {}", opts.dest.display());
    Ok(())
}

fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_to_string(path),
        None => Ok(String::new()),
    }
}
