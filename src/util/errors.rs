//! Error taxonomy for the configurator.
//!
//! Only [`ConfigureError::Configuration`] is ever raised by `configure`.
//! The other two variants describe failures that the downstream compile and
//! link steps would hit; they are produced by `extconf check` as findings.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::layout::RootRole;

/// Errors produced while configuring an extension build.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigureError {
    /// The build-script emitter could not be initialized. Fatal.
    #[error("build script emitter could not be initialized: {reason}")]
    #[diagnostic(
        code(extconf::configure::emitter),
        help("Set CC or pass `--cc`, and check extconf.toml for typos")
    )]
    Configuration { reason: String },

    /// A referenced include or object directory does not exist.
    #[error("{role} directory not found: {}", path.display())]
    #[diagnostic(
        code(extconf::check::missing_dir),
        help("The generated Makefile will fail with a missing header or object")
    )]
    MissingHeaderOrObject { role: RootRole, path: PathBuf },

    /// The object manifest for the link target holds no pre-built objects.
    #[error("no `*{suffix}` objects under {} for link target `{target}`", dir.display())]
    #[diagnostic(
        code(extconf::check::empty_manifest),
        help("Build the core sources first; linking will fail with undefined symbols")
    )]
    Linker {
        target: String,
        dir: PathBuf,
        suffix: String,
    },
}

impl ConfigureError {
    /// Shorthand for a [`ConfigureError::Configuration`].
    pub fn configuration(reason: impl Into<String>) -> Self {
        ConfigureError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the build immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConfigureError::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_fatal() {
        let err = ConfigureError::configuration("no C compiler found");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "build script emitter could not be initialized: no C compiler found"
        );
    }

    #[test]
    fn test_deferred_errors_are_not_fatal() {
        let missing = ConfigureError::MissingHeaderOrObject {
            role: RootRole::CoreInclude,
            path: PathBuf::from("../../../include"),
        };
        assert!(!missing.is_fatal());
        assert!(missing.to_string().contains("core include"));

        let linker = ConfigureError::Linker {
            target: "CFC".to_string(),
            dir: PathBuf::from("../../../src"),
            suffix: ".o".to_string(),
        };
        assert!(!linker.is_fatal());
        assert!(linker.to_string().contains("`CFC`"));
        assert!(linker.to_string().contains("*.o"));
    }
}
