//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use super::{
    quote_if_needed, CommandSpec, CompileInput, LinkInput, MakeDialect, Toolchain,
    ToolchainPlatform,
};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler and link driver)
    pub cl: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: PathBuf) -> Self {
        MsvcToolchain { cl }
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn include_flag(&self, dir: &str) -> String {
        format!("/I{}", quote_if_needed(dir))
    }

    fn pic_flags(&self) -> Vec<String> {
        Vec::new()
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        CommandSpec::new("$(CC)")
            .arg("/nologo")
            .arg("$(CFLAGS)")
            .arg("/c")
            .arg(&input.source)
            .arg(format!("/Fo{}", input.output))
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        CommandSpec::new("$(CC)")
            .arg("/nologo")
            .arg("/LD")
            .arg(&input.objects)
            .arg(format!("/Fe{}", input.output))
            .arg("/link")
            .arg("$(LDFLAGS)")
    }

    fn object_suffix(&self) -> &str {
        ".obj"
    }

    fn module_suffix(&self) -> &str {
        ".dll"
    }

    fn make_dialect(&self) -> MakeDialect {
        MakeDialect::Nmake
    }
}
