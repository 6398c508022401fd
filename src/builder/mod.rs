//! Build script generation.
//!
//! This module turns a layout and a toolchain into include flags, an object
//! manifest, and the Makefile that links them into a loadable module.

pub mod discovery;
pub mod flags;
pub mod makefile;
pub mod toolchain;

pub use discovery::ObjectManifest;
pub use flags::{CompilerFlags, IncludeFlag};
pub use makefile::{BuildScript, BuildScriptInput, BuildScriptSummary, BUILD_SCRIPT_NAME};
pub use toolchain::{
    detect_toolchain, CommandSpec, GccToolchain, HostEnv, MakeDialect, MsvcToolchain, Toolchain,
    ToolchainPlatform,
};
