//! Contract with the external binding compiler.
//!
//! The compiler that parses class declarations and emits bindings lives
//! outside this crate. Callers drive it through four operations:
//!
//! 1. [`Hierarchy::new`] with a destination directory (plus source and
//!    include directories),
//! 2. [`Hierarchy::build`],
//! 3. [`CoreBinding::new`] with the built hierarchy and header/footer text,
//! 4. [`CoreBinding::write_all_modified`].
//!
//! The actual work happens behind a [`CompilerDriver`].

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::errors::ConfigureError;

mod driver;

pub use driver::{CompilerDriver, ProcessDriver, CFC_PROGRAM};

/// A class hierarchy: the declaration sources the compiler reads and the
/// directory its output lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    dest: PathBuf,
    source_dirs: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    built: bool,
}

impl Hierarchy {
    /// Create a hierarchy writing into `dest`.
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Hierarchy {
            dest: dest.into(),
            source_dirs: Vec::new(),
            include_dirs: Vec::new(),
            built: false,
        }
    }

    /// Add a directory of declarations to compile.
    ///
    /// Adding a directory after [`build`](Self::build) requires another build.
    pub fn add_source_dir(&mut self, dir: impl Into<PathBuf>) {
        self.source_dirs.push(dir.into());
        self.built = false;
    }

    /// Add a directory of declarations that are referenced but not compiled.
    pub fn add_include_dir(&mut self, dir: impl Into<PathBuf>) {
        self.include_dirs.push(dir.into());
        self.built = false;
    }

    /// Parse and link the hierarchy.
    ///
    /// Building an already built hierarchy does nothing.
    pub fn build(&mut self, driver: &dyn CompilerDriver) -> Result<()> {
        if self.built {
            tracing::debug!("hierarchy for {} already built", self.dest.display());
            return Ok(());
        }

        tracing::debug!(
            "building hierarchy: {} source dirs, {} include dirs",
            self.source_dirs.len(),
            self.include_dirs.len()
        );
        driver.build(self)?;
        self.built = true;
        Ok(())
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn is_built(&self) -> bool {
        self.built
    }
}

/// The core binding: writes the generated C headers and sources for a
/// built hierarchy.
#[derive(Debug, Clone)]
pub struct CoreBinding<'a> {
    hierarchy: &'a Hierarchy,
    header: String,
    footer: String,
}

impl<'a> CoreBinding<'a> {
    /// `header` and `footer` are text wrapped around every generated file.
    pub fn new(
        hierarchy: &'a Hierarchy,
        header: impl Into<String>,
        footer: impl Into<String>,
    ) -> Self {
        CoreBinding {
            hierarchy,
            header: header.into(),
            footer: footer.into(),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        self.hierarchy
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Write every generated file whose source changed.
    ///
    /// With `modified` set, every file is written regardless. Fails with a
    /// configuration error if the hierarchy has not been built.
    pub fn write_all_modified(&self, modified: bool, driver: &dyn CompilerDriver) -> Result<()> {
        if !self.hierarchy.is_built() {
            return Err(ConfigureError::configuration(
                "the class hierarchy must be built before bindings are written",
            )
            .into());
        }

        driver.write_core(self, modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingDriver {
        calls: RefCell<Vec<String>>,
    }

    impl CompilerDriver for RecordingDriver {
        fn build(&self, hierarchy: &Hierarchy) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("build {}", hierarchy.source_dirs().len()));
            Ok(())
        }

        fn write_core(&self, binding: &CoreBinding<'_>, modified: bool) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("write {} {}", binding.header(), modified));
            Ok(())
        }
    }

    #[test]
    fn test_contract_in_order() {
        let driver = RecordingDriver::default();
        let mut hierarchy = Hierarchy::new("autogen");
        hierarchy.add_source_dir("core");
        hierarchy.add_include_dir("../compiler/include");
        hierarchy.build(&driver).unwrap();

        let core = CoreBinding::new(&hierarchy, "/* header */", "/* footer */");
        core.write_all_modified(false, &driver).unwrap();

        assert_eq!(
            *driver.calls.borrow(),
            vec!["build 1", "write /* header */ false"]
        );
    }

    #[test]
    fn test_build_twice_is_noop() {
        let driver = RecordingDriver::default();
        let mut hierarchy = Hierarchy::new("autogen");
        hierarchy.add_source_dir("core");

        hierarchy.build(&driver).unwrap();
        hierarchy.build(&driver).unwrap();

        assert_eq!(driver.calls.borrow().len(), 1);
        assert!(hierarchy.is_built());
    }

    #[test]
    fn test_adding_dir_requires_rebuild() {
        let driver = RecordingDriver::default();
        let mut hierarchy = Hierarchy::new("autogen");
        hierarchy.build(&driver).unwrap();
        hierarchy.add_source_dir("more");
        assert!(!hierarchy.is_built());

        hierarchy.build(&driver).unwrap();
        assert_eq!(*driver.calls.borrow(), vec!["build 0", "build 1"]);
    }

    #[test]
    fn test_write_before_build_is_configuration_error() {
        let driver = RecordingDriver::default();
        let hierarchy = Hierarchy::new("autogen");
        let core = CoreBinding::new(&hierarchy, "", "");

        let err = core.write_all_modified(true, &driver).unwrap_err();
        let err = err.downcast_ref::<ConfigureError>().unwrap();
        assert!(err.is_fatal());
        assert!(driver.calls.borrow().is_empty());
    }
}
