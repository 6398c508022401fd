//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{
    quote_if_needed, CommandSpec, CompileInput, LinkInput, MakeDialect, Toolchain,
    ToolchainPlatform,
};

/// GCC/Clang toolchain (Unix-like systems, MinGW).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Compiler family (gcc, clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, family }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn include_flag(&self, dir: &str) -> String {
        format!("-I{}", quote_if_needed(dir))
    }

    fn pic_flags(&self) -> Vec<String> {
        if cfg!(windows) {
            Vec::new()
        } else {
            vec!["-fPIC".to_string()]
        }
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        CommandSpec::new("$(CC)")
            .arg("$(CFLAGS)")
            .arg("-c")
            .arg(&input.source)
            .arg("-o")
            .arg(&input.output)
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new("$(CC)");

        // Host runtimes resolve their own symbols when the module is loaded
        if cfg!(target_os = "macos") {
            cmd = cmd.args(["-bundle", "-undefined", "dynamic_lookup"]);
        } else {
            cmd = cmd.arg("-shared");
        }

        cmd.arg("-o")
            .arg(&input.output)
            .arg(&input.objects)
            .arg("$(LDFLAGS)")
    }

    fn object_suffix(&self) -> &str {
        ".o"
    }

    fn module_suffix(&self) -> &str {
        if cfg!(target_os = "macos") {
            ".bundle"
        } else if cfg!(windows) {
            ".dll"
        } else {
            ".so"
        }
    }

    fn make_dialect(&self) -> MakeDialect {
        MakeDialect::Posix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc() -> GccToolchain {
        GccToolchain::new(PathBuf::from("/usr/bin/gcc"), ToolchainPlatform::Gcc)
    }

    #[test]
    fn test_include_flag() {
        assert_eq!(gcc().include_flag("../../include"), "-I../../include");
        assert_eq!(gcc().include_flag("my dir"), "-I\"my dir\"");
    }

    #[test]
    fn test_compile_command() {
        let cmd = gcc().compile_command(&CompileInput {
            source: "$(srcdir)/CFC.c".to_string(),
            output: "$@".to_string(),
        });
        assert_eq!(cmd.to_recipe(), "$(CC) $(CFLAGS) -c $(srcdir)/CFC.c -o $@");
    }

    #[test]
    fn test_link_shared_command() {
        let cmd = gcc().link_shared_command(&LinkInput {
            objects: "$(OBJS)".to_string(),
            output: "$@".to_string(),
        });
        let recipe = cmd.to_recipe();
        assert!(recipe.starts_with("$(CC) "));
        assert!(recipe.ends_with("-o $@ $(OBJS) $(LDFLAGS)"));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(gcc().object_suffix(), ".o");
        assert!(gcc().module_suffix().starts_with('.'));
        assert_eq!(gcc().make_dialect(), MakeDialect::Posix);
    }
}
