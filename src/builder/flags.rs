//! Include flags derived from a layout.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::builder::toolchain::Toolchain;
use crate::core::layout::{PathSet, RootRole};
use crate::util::fs::{relative_path, to_make_path};

/// One `-I` token and the root it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeFlag {
    pub role: RootRole,
    pub flag: String,
}

/// Ordered include flags for the compile step.
///
/// Tokens appear in [`RootRole`] declaration order. Absent optional roots
/// contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompilerFlags {
    includes: Vec<IncludeFlag>,
}

impl CompilerFlags {
    /// Derive the include flags for `roots`.
    ///
    /// Roots are resolved against `anchor` and rendered relative to
    /// `invocation_dir`, where the build script is consumed.
    pub fn from_path_set(
        roots: &PathSet,
        anchor: &Path,
        invocation_dir: &Path,
        toolchain: &dyn Toolchain,
    ) -> Self {
        let includes = roots
            .roots()
            .map(|(role, root)| {
                let dir = relative_path(invocation_dir, &root.resolve(anchor));
                IncludeFlag {
                    role,
                    flag: toolchain.include_flag(&to_make_path(&dir)),
                }
            })
            .collect();

        CompilerFlags { includes }
    }

    /// The tokens, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(|i| i.flag.as_str())
    }

    /// Tokens with their originating roots.
    pub fn includes(&self) -> &[IncludeFlag] {
        &self.includes
    }

    pub fn len(&self) -> usize {
        self.includes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }
}

impl fmt::Display for CompilerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.tokens().collect();
        f.write_str(&tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GccToolchain, MsvcToolchain, ToolchainPlatform};
    use crate::core::layout::{LayoutPreset, RelativePath};
    use std::path::PathBuf;

    fn gcc() -> GccToolchain {
        GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc)
    }

    #[test]
    fn test_two_tokens_without_optional_roots() {
        let anchor = Path::new("/work/compiler/ruby/ext/Clownfish");
        let flags = CompilerFlags::from_path_set(
            &LayoutPreset::Compiler.path_set(),
            anchor,
            anchor,
            &gcc(),
        );

        assert_eq!(flags.len(), 2);
        assert_eq!(flags.to_string(), "-I../../../include -I../../../src");
        assert!(flags.tokens().all(|t| t.len() > "-I".len()));
    }

    #[test]
    fn test_rendered_relative_to_invocation_dir() {
        let anchor = Path::new("/work/compiler/ruby/ext/Clownfish");
        let invocation = Path::new("/work/compiler/ruby");
        let flags = CompilerFlags::from_path_set(
            &LayoutPreset::Compiler.path_set(),
            anchor,
            invocation,
            &gcc(),
        );

        assert_eq!(flags.to_string(), "-I../include -I../src");
    }

    #[test]
    fn test_all_roots_in_declaration_order() {
        let anchor = Path::new("/work/runtime/ruby/ext/Bind");
        let flags = CompilerFlags::from_path_set(
            &LayoutPreset::Runtime.path_set(),
            anchor,
            anchor,
            &gcc(),
        );

        let roles: Vec<_> = flags.includes().iter().map(|i| i.role).collect();
        assert_eq!(
            roles,
            vec![
                RootRole::CoreInclude,
                RootRole::CoreSource,
                RootRole::PeerRuntime,
                RootRole::Autogen
            ]
        );
        assert_eq!(
            flags.to_string(),
            "-I../../../../compiler/include -I../../../../compiler/src \
             -I../../../core -I../../../autogen/include"
        );
    }

    #[test]
    fn test_msvc_flag_style() {
        let anchor = Path::new("/work/ext");
        let roots = PathSet::new(
            RelativePath::parse("../include").unwrap(),
            RelativePath::parse("../src").unwrap(),
        );
        let flags = CompilerFlags::from_path_set(
            &roots,
            anchor,
            anchor,
            &MsvcToolchain::new(PathBuf::from("cl")),
        );

        assert_eq!(flags.to_string(), "/I../include /I../src");
    }

    #[test]
    fn test_deterministic() {
        let anchor = Path::new("/work/runtime/ruby/ext/Bind");
        let roots = LayoutPreset::Runtime.path_set();
        let first = CompilerFlags::from_path_set(&roots, anchor, anchor, &gcc());
        let second = CompilerFlags::from_path_set(&roots, anchor, anchor, &gcc());
        assert_eq!(first.to_string(), second.to_string());
    }
}
