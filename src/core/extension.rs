//! The extension being configured.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::util::errors::ConfigureError;

static TARGET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// The link target and its wrapper source.
///
/// The target name doubles as the host runtime's init symbol suffix
/// (`Init_CFC`), so it must be a C identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionSpec {
    target: String,
    wrapper_source: PathBuf,
}

impl ExtensionSpec {
    /// Create a spec whose wrapper source is `<target>.c` in the anchor directory.
    pub fn new(target: impl Into<String>) -> Result<Self, ConfigureError> {
        let target = target.into();
        if !TARGET_NAME.is_match(&target) {
            return Err(ConfigureError::configuration(format!(
                "invalid extension name `{}`; expected a C identifier",
                target
            )));
        }
        let wrapper_source = PathBuf::from(format!("{}.c", target));
        Ok(ExtensionSpec {
            target,
            wrapper_source,
        })
    }

    /// Override the wrapper source.
    ///
    /// The path must be relative to the anchor directory: the Makefile
    /// refers to it as `$(srcdir)/<path>`.
    pub fn with_wrapper_source(
        mut self,
        source: impl Into<PathBuf>,
    ) -> Result<Self, ConfigureError> {
        let source = source.into();
        let rooted = source.has_root()
            || source
                .components()
                .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
        if rooted || source.as_os_str().is_empty() {
            return Err(ConfigureError::configuration(format!(
                "wrapper source `{}` must be relative to the anchor directory",
                source.display()
            )));
        }
        self.wrapper_source = source;
        Ok(self)
    }

    /// Link target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Wrapper source, relative to the anchor directory.
    pub fn wrapper_source(&self) -> &Path {
        &self.wrapper_source
    }

    /// File name of the wrapper object, e.g. `CFC.o`.
    pub fn wrapper_object(&self, obj_ext: &str) -> String {
        format!("{}{}", self.target, obj_ext)
    }
}
