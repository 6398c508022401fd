//! Drivers for the external binding compiler.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use super::{CoreBinding, Hierarchy};
use crate::util::errors::ConfigureError;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_executable, ProcessBuilder};

/// Name of the compiler executable looked up on PATH.
pub const CFC_PROGRAM: &str = "cfc";

/// Backend that performs the compiler's work.
pub trait CompilerDriver {
    /// Parse and link the hierarchy's declarations.
    fn build(&self, hierarchy: &Hierarchy) -> Result<()>;

    /// Write the core binding's generated files.
    fn write_core(&self, binding: &CoreBinding<'_>, modified: bool) -> Result<()>;
}

/// Runs the standalone `cfc` executable.
///
/// `cfc` parses and writes in a single run, so [`build`](CompilerDriver::build)
/// only prepares and checks the inputs and the process is spawned by
/// [`write_core`](CompilerDriver::write_core).
#[derive(Debug, Clone)]
pub struct ProcessDriver {
    program: PathBuf,
}

impl ProcessDriver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessDriver {
            program: program.into(),
        }
    }

    /// Use `explicit` if given, otherwise find `cfc` on PATH.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self, ConfigureError> {
        explicit
            .or_else(|| find_executable(CFC_PROGRAM))
            .map(Self::new)
            .ok_or_else(|| {
                ConfigureError::configuration(format!(
                    "`{}` not found on PATH; pass `--cfc`",
                    CFC_PROGRAM
                ))
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The command line for one compiler run.
    pub fn command(&self, hierarchy: &Hierarchy, header: &Path, footer: &Path) -> ProcessBuilder {
        let mut cmd =
            ProcessBuilder::new(&self.program).arg(format!("--dest={}", hierarchy.dest().display()));
        for dir in hierarchy.source_dirs() {
            cmd = cmd.arg(format!("--source={}", dir.display()));
        }
        for dir in hierarchy.include_dirs() {
            cmd = cmd.arg(format!("--include={}", dir.display()));
        }
        cmd.arg(format!("--header={}", header.display()))
            .arg(format!("--footer={}", footer.display()))
    }
}

impl CompilerDriver for ProcessDriver {
    fn build(&self, hierarchy: &Hierarchy) -> Result<()> {
        for dir in hierarchy.source_dirs().iter().chain(hierarchy.include_dirs()) {
            if !dir.is_dir() {
                return Err(ConfigureError::configuration(format!(
                    "declaration directory not found: {}",
                    dir.display()
                ))
                .into());
            }
        }
        ensure_dir(hierarchy.dest())
    }

    fn write_core(&self, binding: &CoreBinding<'_>, modified: bool) -> Result<()> {
        if modified {
            // cfc compares file contents itself and has no switch to force writes
            tracing::debug!("forced rewrite is not supported by `{}`", self.program.display());
        }

        let header = text_file(binding.header())?;
        let footer = text_file(binding.footer())?;

        let cmd = self.command(binding.hierarchy(), header.path(), footer.path());
        tracing::info!("running {}", cmd.display_command());
        cmd.exec_and_check()?;
        Ok(())
    }
}

fn text_file(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to create temporary file")?;
    file.write_all(contents.as_bytes())
        .context("failed to write temporary file")?;
    file.flush()?;
    Ok(file)
}
