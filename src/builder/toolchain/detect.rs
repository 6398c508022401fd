//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use crate::util::config::ToolchainSettings;
use crate::util::errors::ConfigureError;
use crate::util::process::find_c_compiler;

use super::{GccToolchain, MsvcToolchain, ObjectSuffixOverride, Toolchain, ToolchainPlatform};

/// The host build environment variables extconf honours.
///
/// Captured once per invocation so detection itself never reads the
/// process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    /// `CC`: the C compiler command
    pub cc: Option<String>,
    /// `OBJEXT`: the object file suffix
    pub objext: Option<String>,
}

impl HostEnv {
    /// Read `CC` and `OBJEXT` from the process environment.
    pub fn capture() -> Self {
        HostEnv {
            cc: non_empty_var("CC"),
            objext: non_empty_var("OBJEXT"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Detect the toolchain used to render the build script.
///
/// The compiler is taken from, in order: `overrides.cc` (command line),
/// `config.cc`, the `CC` environment variable, then PATH. The compiler is
/// named verbatim and never executed; a wrong name surfaces when make runs.
///
/// The object suffix is taken from `overrides.obj_ext`, `OBJEXT`,
/// `config.obj_ext`, then the compiler family's convention.
pub fn detect_toolchain(
    overrides: &ToolchainSettings,
    config: &ToolchainSettings,
    env: &HostEnv,
) -> Result<Box<dyn Toolchain>, ConfigureError> {
    let cc = overrides
        .cc
        .clone()
        .or_else(|| config.cc.clone())
        .or_else(|| env.cc.as_ref().map(PathBuf::from))
        .or_else(find_c_compiler)
        .ok_or_else(|| {
            ConfigureError::configuration(
                "no C compiler found; set CC, pass `--cc`, or install cc/gcc/clang",
            )
        })?;

    let family = detect_compiler_family(&cc);
    tracing::debug!("using {} toolchain: {}", family.as_str(), cc.display());

    let toolchain: Box<dyn Toolchain> = match family {
        ToolchainPlatform::Msvc => Box::new(MsvcToolchain::new(cc)),
        family => Box::new(GccToolchain::new(cc, family)),
    };

    let suffix = overrides
        .obj_ext
        .clone()
        .or_else(|| env.objext.clone())
        .or_else(|| config.obj_ext.clone());

    match suffix {
        Some(suffix) => {
            tracing::debug!("object suffix overridden: {}", suffix);
            Ok(Box::new(ObjectSuffixOverride::new(toolchain, &suffix)?))
        }
        None => Ok(toolchain),
    }
}

/// Guess the compiler family from the compiler command.
///
/// Only the last word of the command counts, so launchers such as
/// `ccache gcc` are classified by the real compiler.
pub fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    let command = cc.to_string_lossy();
    let last_word = command.split_whitespace().last().unwrap_or("");
    let stem = Path::new(last_word)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if stem == "cl" || stem == "clang-cl" {
        ToolchainPlatform::Msvc
    } else if stem.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}
