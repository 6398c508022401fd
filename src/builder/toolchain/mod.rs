//! Toolchain abstraction for the generated build script.
//!
//! A toolchain knows how the host compiler spells include flags, which
//! object and loadable-module suffixes it produces, and how compile and
//! link recipes look. Recipes are rendered with make variables (`$(CC)`,
//! `$(CFLAGS)`, `$@`) so the Makefile stays readable and overridable.
//!
//! Toolchain detection priority:
//! 1. `--cc` on the command line
//! 2. `[toolchain] cc` in `extconf.toml` or `~/.extconf/config.toml`
//! 3. The `CC` environment variable
//! 4. Searching PATH for common compilers

use std::path::Path;

use serde::Serialize;

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_compiler_family, detect_toolchain, HostEnv};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

use crate::util::errors::ConfigureError;

/// A command to render into a make recipe line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (usually a make variable such as `$(CC)`)
    pub program: String,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Render as a single recipe line.
    pub fn to_recipe(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Input for the wrapper compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file, as make sees it
    pub source: String,
    /// Output object file, as make sees it
    pub output: String,
}

/// Input for the link step.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Objects to link (usually `$(OBJS)`)
    pub objects: String,
    /// Output module (usually `$@`)
    pub output: String,
}

/// The make flavour a toolchain's build script is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MakeDialect {
    /// GNU/BSD make driving a POSIX shell
    Posix,
    /// Microsoft nmake driving cmd.exe
    Nmake,
}

impl MakeDialect {
    /// Escape a file name so it survives as one word in both rule lines
    /// and recipes.
    ///
    /// `$` and line breaks have no spelling that works in both places and
    /// are rejected.
    pub fn escape_path(&self, word: &str) -> Result<String, ConfigureError> {
        reject_unescapable(word)?;
        let escaped = match self {
            MakeDialect::Posix => {
                let mut out = String::with_capacity(word.len());
                for c in word.chars() {
                    if matches!(c, ' ' | '\t' | '#') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            }
            MakeDialect::Nmake => {
                let word = word.replace('#', "^#");
                if word.chars().any(char::is_whitespace) {
                    format!("\"{}\"", word)
                } else {
                    word
                }
            }
        };
        Ok(escaped)
    }

    /// Escape make's comment character in text already quoted for the
    /// shell, such as an include flag.
    pub fn escape_text(&self, text: &str) -> Result<String, ConfigureError> {
        reject_unescapable(text)?;
        Ok(match self {
            MakeDialect::Posix => text.replace('#', "\\#"),
            MakeDialect::Nmake => text.replace('#', "^#"),
        })
    }
}

fn reject_unescapable(word: &str) -> Result<(), ConfigureError> {
    if let Some(c) = word.chars().find(|c| matches!(c, '$' | '\n' | '\r')) {
        return Err(ConfigureError::configuration(format!(
            "`{}` contains {:?}, which cannot be written into a Makefile",
            word, c
        )));
    }
    Ok(())
}

/// The platform/family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    Gcc,
    Clang,
    Msvc,
}

impl ToolchainPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to spell recipes for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Render an include flag for a directory.
    fn include_flag(&self, dir: &str) -> String;

    /// Flags needed to compile objects for a loadable module.
    fn pic_flags(&self) -> Vec<String>;

    /// Generate the wrapper compile recipe.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate the loadable-module link recipe.
    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec;

    /// Object file suffix, including the dot.
    fn object_suffix(&self) -> &str;

    /// Loadable module suffix, including the dot.
    fn module_suffix(&self) -> &str;

    /// Make flavour for the build script.
    fn make_dialect(&self) -> MakeDialect;
}

/// Quote a make word for the shell if it contains whitespace.
pub(crate) fn quote_if_needed(word: &str) -> String {
    if word.chars().any(char::is_whitespace) {
        format!("\"{}\"", word)
    } else {
        word.to_string()
    }
}

/// Normalize and validate an object suffix such as `o`, `.o` or `.obj`.
pub fn normalize_object_suffix(raw: &str) -> Result<String, ConfigureError> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);

    if bare.is_empty() {
        return Err(ConfigureError::configuration(format!(
            "object suffix `{}` is empty",
            raw
        )));
    }
    if !bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigureError::configuration(format!(
            "object suffix `{}` contains invalid characters",
            raw
        )));
    }

    Ok(format!(".{}", bare))
}

/// A wrapper that replaces the object suffix of another toolchain.
///
/// Used when the host environment names the suffix explicitly (`OBJEXT`,
/// `--obj-ext`, or `[toolchain] obj_ext`). Everything else is delegated.
#[derive(Debug, Clone)]
pub struct ObjectSuffixOverride<T> {
    inner: T,
    suffix: String,
}

impl<T> ObjectSuffixOverride<T> {
    /// Wrap a toolchain, validating the suffix.
    pub fn new(inner: T, suffix: &str) -> Result<Self, ConfigureError> {
        Ok(ObjectSuffixOverride {
            inner,
            suffix: normalize_object_suffix(suffix)?,
        })
    }
}

impl<T: Toolchain + ?Sized> Toolchain for ObjectSuffixOverride<Box<T>> {
    fn platform(&self) -> ToolchainPlatform {
        self.inner.platform()
    }

    fn compiler_path(&self) -> &Path {
        self.inner.compiler_path()
    }

    fn include_flag(&self, dir: &str) -> String {
        self.inner.include_flag(dir)
    }

    fn pic_flags(&self) -> Vec<String> {
        self.inner.pic_flags()
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        self.inner.compile_command(input)
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        self.inner.link_shared_command(input)
    }

    fn object_suffix(&self) -> &str {
        &self.suffix
    }

    fn module_suffix(&self) -> &str {
        self.inner.module_suffix()
    }

    fn make_dialect(&self) -> MakeDialect {
        self.inner.make_dialect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_command_spec_to_recipe() {
        let cmd = CommandSpec::new("$(CC)").arg("-c").args(["$<", "-o", "$@"]);
        assert_eq!(cmd.to_recipe(), "$(CC) -c $< -o $@");
    }

    #[test]
    fn test_normalize_object_suffix() {
        assert_eq!(normalize_object_suffix("o").unwrap(), ".o");
        assert_eq!(normalize_object_suffix(".obj").unwrap(), ".obj");
        assert_eq!(normalize_object_suffix(" .o ").unwrap(), ".o");
        assert!(normalize_object_suffix("").is_err());
        assert!(normalize_object_suffix(".").is_err());
        assert!(normalize_object_suffix("*.o").is_err());
        assert!(normalize_object_suffix("o/x").is_err());
    }

    #[test]
    fn test_suffix_override_delegates() {
        let gcc: Box<dyn Toolchain> = Box::new(GccToolchain::new(
            PathBuf::from("cc"),
            ToolchainPlatform::Gcc,
        ));
        let wrapped = ObjectSuffixOverride::new(gcc, "obj").unwrap();

        assert_eq!(wrapped.object_suffix(), ".obj");
        assert_eq!(wrapped.platform(), ToolchainPlatform::Gcc);
        assert_eq!(wrapped.include_flag("../include"), "-I../include");
        assert_eq!(wrapped.make_dialect(), MakeDialect::Posix);
    }

    #[test]
    fn test_escape_path_posix() {
        let posix = MakeDialect::Posix;
        assert_eq!(posix.escape_path("../src/Foo.o").unwrap(), "../src/Foo.o");
        assert_eq!(
            posix.escape_path("../my checkout/src/Foo.o").unwrap(),
            "../my\\ checkout/src/Foo.o"
        );
        assert_eq!(posix.escape_path("../build#2/Foo.o").unwrap(), "../build\\#2/Foo.o");
        assert_eq!(posix.escape_text("-I\"../a #b\"").unwrap(), "-I\"../a \\#b\"");
    }

    #[test]
    fn test_escape_path_nmake() {
        let nmake = MakeDialect::Nmake;
        assert_eq!(nmake.escape_path("../src/Foo.obj").unwrap(), "../src/Foo.obj");
        assert_eq!(
            nmake.escape_path("../my checkout/Foo.obj").unwrap(),
            "\"../my checkout/Foo.obj\""
        );
        assert_eq!(nmake.escape_path("../build#2/Foo.obj").unwrap(), "../build^#2/Foo.obj");
    }

    #[test]
    fn test_escape_rejects_dollar_and_newlines() {
        for dialect in [MakeDialect::Posix, MakeDialect::Nmake] {
            assert!(dialect.escape_path("../$HOME/Foo.o").unwrap_err().is_fatal());
            assert!(dialect.escape_path("../a\nb/Foo.o").is_err());
            assert!(dialect.escape_text("-I$(HOME)").is_err());
        }
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("../include"), "../include");
        assert_eq!(quote_if_needed("../my include"), "\"../my include\"");
    }
}
