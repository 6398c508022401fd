//! The generated build script.
//!
//! A [`BuildScript`] is an ordered list of make variables and rules plus a
//! cleanup list. It declares exactly one link target, named after the
//! extension, and declares `INCFLAGS` before `OBJS`. Rendering is pure and
//! deterministic: no timestamps, no host-dependent ordering.

use std::fmt::Write as _;

use serde::Serialize;

use crate::builder::flags::CompilerFlags;
use crate::builder::toolchain::{CompileInput, LinkInput, MakeDialect, Toolchain};
use crate::core::extension::ExtensionSpec;
use crate::util::errors::ConfigureError;
use crate::util::hash::{sha256_str, Fingerprint};

/// Default file name of the build script.
pub const BUILD_SCRIPT_NAME: &str = "Makefile";

/// `$(srcdir)/<path>` as one make word.
fn srcdir_word(dialect: MakeDialect, srcdir: &str, path: &str) -> Result<String, ConfigureError> {
    match dialect {
        MakeDialect::Posix => Ok(format!("$(srcdir)/{}", dialect.escape_path(path)?)),
        MakeDialect::Nmake => {
            let word = format!("$(srcdir)/{}", dialect.escape_text(path)?);
            if srcdir.chars().chain(path.chars()).any(char::is_whitespace) {
                Ok(format!("\"{}\"", word))
            } else {
                Ok(word)
            }
        }
    }
}

/// A make variable whose value is a list of words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeVar {
    name: String,
    elements: Vec<String>,
}

impl MakeVar {
    pub fn new(name: impl Into<String>) -> Self {
        MakeVar {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Append a word. Empty words are dropped.
    pub fn append(mut self, element: impl Into<String>) -> Self {
        let element = element.into();
        if !element.is_empty() {
            self.elements.push(element);
        }
        self
    }

    pub fn extend(mut self, elements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for element in elements {
            self = self.append(element);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    fn render(&self, out: &mut String) {
        match self.elements.as_slice() {
            [] => {
                let _ = writeln!(out, "{} =", self.name);
            }
            [single] => {
                let _ = writeln!(out, "{} = {}", self.name, single);
            }
            many => {
                let _ = write!(out, "{} =", self.name);
                for element in many {
                    let _ = write!(out, " \\\n    {}", element);
                }
                out.push('\n');
            }
        }
    }
}

/// What a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Links the loadable module
    Link,
    /// Compiles an object
    Compile,
    /// Does not produce a file (`all`, `clean`, ...)
    Phony,
}

/// A make rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeRule {
    kind: RuleKind,
    target: String,
    prereqs: Vec<String>,
    commands: Vec<String>,
}

impl MakeRule {
    pub fn new(kind: RuleKind, target: impl Into<String>) -> Self {
        MakeRule {
            kind,
            target: target.into(),
            prereqs: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn prereq(mut self, prereq: impl Into<String>) -> Self {
        self.prereqs.push(prereq.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn prereqs(&self) -> &[String] {
        &self.prereqs
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn render(&self, out: &mut String) {
        let _ = write!(out, "{} :", self.target);
        for prereq in &self.prereqs {
            let _ = write!(out, " {}", prereq);
        }
        out.push('\n');
        for command in &self.commands {
            let _ = writeln!(out, "\t{}", command);
        }
        out.push('\n');
    }
}

/// Everything the emitter needs besides the toolchain.
#[derive(Debug, Clone)]
pub struct BuildScriptInput<'a> {
    pub spec: &'a ExtensionSpec,
    pub flags: &'a CompilerFlags,
    /// Manifest entries as make sees them, wrapper first
    pub objects: Vec<String>,
    /// Anchor directory relative to where make runs
    pub srcdir: String,
    pub cflags: &'a [String],
    pub ldflags: &'a [String],
    /// Name the script is written under, removed by `distclean`
    pub file_name: &'a str,
}

/// A generated build script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildScript {
    target: String,
    dialect: MakeDialect,
    include_flags: Vec<String>,
    objects: Vec<String>,
    vars: Vec<MakeVar>,
    rules: Vec<MakeRule>,
    cleanup: Vec<String>,
    file_name: String,
}

/// Machine-readable summary of a build script.
#[derive(Debug, Clone, Serialize)]
pub struct BuildScriptSummary {
    pub target: String,
    pub dialect: MakeDialect,
    pub module: String,
    pub include_flags: Vec<String>,
    pub objects: Vec<String>,
    pub inputs_fingerprint: String,
    pub content_sha256: String,
}

impl BuildScript {
    /// Assemble the build script for one extension.
    ///
    /// File names are escaped for the toolchain's make dialect; a name that
    /// cannot be escaped is a configuration error.
    pub fn assemble(
        input: &BuildScriptInput<'_>,
        toolchain: &dyn Toolchain,
    ) -> Result<Self, ConfigureError> {
        let dialect = toolchain.make_dialect();
        let target = input.spec.target().to_string();
        let obj_ext = toolchain.object_suffix();
        let dl_ext = toolchain.module_suffix();
        let module = format!("{}{}", target, dl_ext);
        let wrapper_obj = input.spec.wrapper_object(obj_ext);
        let wrapper_src = srcdir_word(
            dialect,
            &input.srcdir,
            &input.spec.wrapper_source().to_string_lossy().replace('\\', "/"),
        )?;
        let include_flags: Vec<String> = input.flags.tokens().map(str::to_string).collect();

        let srcdir = match dialect {
            MakeDialect::Posix => dialect.escape_path(&input.srcdir)?,
            // Quoted as part of each `$(srcdir)/...` word instead
            MakeDialect::Nmake => dialect.escape_text(&input.srcdir)?,
        };
        let escaped_flags = include_flags
            .iter()
            .map(|flag| dialect.escape_text(flag))
            .collect::<Result<Vec<_>, _>>()?;
        let escaped_objects = input
            .objects
            .iter()
            .map(|object| dialect.escape_path(object))
            .collect::<Result<Vec<_>, _>>()?;

        let vars = vec![
            MakeVar::new("CC").append(toolchain.compiler_path().to_string_lossy()),
            MakeVar::new("srcdir").append(srcdir),
            MakeVar::new("OBJ_EXT").append(obj_ext),
            MakeVar::new("DL_EXT").append(dl_ext),
            MakeVar::new("TARGET").append(target.as_str()),
            MakeVar::new("INCFLAGS").extend(escaped_flags),
            MakeVar::new("CFLAGS")
                .append("$(INCFLAGS)")
                .extend(toolchain.pic_flags())
                .extend(input.cflags.iter().cloned()),
            MakeVar::new("LDFLAGS").extend(input.ldflags.iter().cloned()),
            MakeVar::new("OBJS").extend(escaped_objects),
        ];

        let link = toolchain.link_shared_command(&LinkInput {
            objects: "$(OBJS)".to_string(),
            output: "$@".to_string(),
        });
        let compile = toolchain.compile_command(&CompileInput {
            source: wrapper_src.clone(),
            output: "$@".to_string(),
        });

        let rules = vec![
            MakeRule::new(RuleKind::Phony, "all").prereq(module.as_str()),
            MakeRule::new(RuleKind::Link, module.as_str())
                .prereq("$(OBJS)")
                .command(link.to_recipe()),
            MakeRule::new(RuleKind::Compile, wrapper_obj.as_str())
                .prereq(wrapper_src)
                .command(compile.to_recipe()),
        ];

        Ok(BuildScript {
            target,
            dialect,
            include_flags,
            objects: input.objects.clone(),
            vars,
            rules,
            cleanup: vec![module, wrapper_obj],
            file_name: dialect.escape_path(input.file_name)?,
        })
    }

    /// Link target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Make flavour the script is written for.
    pub fn dialect(&self) -> MakeDialect {
        self.dialect
    }

    /// Include flags as a single space-separated string.
    pub fn flag_string(&self) -> String {
        self.include_flags.join(" ")
    }

    /// Include flag tokens, in order.
    pub fn include_flags(&self) -> &[String] {
        &self.include_flags
    }

    /// Object manifest entries, wrapper first.
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn vars(&self) -> &[MakeVar] {
        &self.vars
    }

    pub fn rules(&self) -> &[MakeRule] {
        &self.rules
    }

    /// Rules that link a loadable module. Always exactly one.
    pub fn link_rules(&self) -> impl Iterator<Item = &MakeRule> {
        self.rules.iter().filter(|r| r.kind == RuleKind::Link)
    }

    /// Name the script is written under, as make spells it.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Hash of the inputs that shape the script.
    pub fn inputs_fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(&self.target)
            .update_strs(self.include_flags.iter().map(String::as_str))
            .update_strs(self.objects.iter().map(String::as_str));
        fp.finish_short()
    }

    /// SHA-256 of the rendered content.
    pub fn content_hash(&self) -> String {
        sha256_str(&self.render())
    }

    /// Machine-readable summary for `--plan` output.
    pub fn summary(&self) -> BuildScriptSummary {
        BuildScriptSummary {
            target: self.target.clone(),
            dialect: self.dialect,
            module: self
                .link_rules()
                .next()
                .map(|r| r.target.clone())
                .unwrap_or_default(),
            include_flags: self.include_flags.clone(),
            objects: self.objects.clone(),
            inputs_fingerprint: self.inputs_fingerprint(),
            content_sha256: self.content_hash(),
        }
    }

    /// Render the script.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "# Makefile for the {} extension, generated by extconf.",
            self.target
        );
        out.push_str("# Do not edit; re-run `extconf configure` instead.\n\n");

        for var in &self.vars {
            var.render(&mut out);
        }
        out.push('\n');

        for rule in &self.rules {
            rule.render(&mut out);
        }

        self.render_clean(&mut out);

        if self.dialect == MakeDialect::Posix {
            out.push_str(".PHONY : all clean distclean\n");
        }

        out
    }

    fn render_clean(&self, out: &mut String) {
        out.push_str("clean :\n");
        match self.dialect {
            MakeDialect::Posix => {
                out.push_str("\trm -f");
                for file in &self.cleanup {
                    let _ = write!(out, " \\\n\t    {}", file);
                }
                out.push('\n');
            }
            MakeDialect::Nmake => {
                for file in &self.cleanup {
                    let _ = writeln!(out, "\tfor %i in ({}) do @if exist %i del /f %i", file);
                }
            }
        }
        out.push('\n');

        out.push_str("distclean : clean\n");
        match self.dialect {
            MakeDialect::Posix => {
                let _ = writeln!(out, "\trm -f {}", self.file_name);
            }
            MakeDialect::Nmake => {
                let _ = writeln!(
                    out,
                    "\tfor %i in ({}) do @if exist %i del /f %i",
                    self.file_name
                );
            }
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::{GccToolchain, MsvcToolchain, ToolchainPlatform};
    use crate::core::layout::LayoutPreset;
    use std::path::{Path, PathBuf};

    fn gcc() -> GccToolchain {
        GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc)
    }

    fn script_with(toolchain: &dyn Toolchain, objects: Vec<String>) -> BuildScript {
        let spec = ExtensionSpec::new("CFC").unwrap();
        let anchor = Path::new("/work/compiler/ruby/ext/Clownfish");
        let flags = CompilerFlags::from_path_set(
            &LayoutPreset::Compiler.path_set(),
            anchor,
            anchor,
            toolchain,
        );
        BuildScript::assemble(
            &BuildScriptInput {
                spec: &spec,
                flags: &flags,
                objects,
                srcdir: ".".to_string(),
                cflags: &["-O2".to_string()],
                ldflags: &[],
                file_name: BUILD_SCRIPT_NAME,
            },
            toolchain,
        )
        .unwrap()
    }

    fn spaced_script(
        toolchain: &dyn Toolchain,
        objects: &[&str],
    ) -> Result<BuildScript, ConfigureError> {
        let spec = ExtensionSpec::new("CFC").unwrap();
        let anchor = Path::new("/work/my checkout/compiler/ruby/ext/Clownfish");
        let flags = CompilerFlags::from_path_set(
            &LayoutPreset::Compiler.path_set(),
            anchor,
            Path::new("/work"),
            toolchain,
        );
        BuildScript::assemble(
            &BuildScriptInput {
                spec: &spec,
                flags: &flags,
                objects: objects.iter().map(|o| o.to_string()).collect(),
                srcdir: "my checkout/compiler/ruby/ext/Clownfish".to_string(),
                cflags: &[],
                ldflags: &[],
                file_name: "Makefile #1",
            },
            toolchain,
        )
    }

    #[test]
    fn test_make_var_rendering() {
        let mut out = String::new();
        MakeVar::new("LDFLAGS").render(&mut out);
        MakeVar::new("CC").append("cc").render(&mut out);
        MakeVar::new("OBJS").extend(["CFC.o", "Foo.o"]).render(&mut out);
        assert_eq!(out, "LDFLAGS =\nCC = cc\nOBJS = \\\n    CFC.o \\\n    Foo.o\n");
    }

    #[test]
    fn test_exactly_one_link_target_named_after_extension() {
        let tc = gcc();
        let script = script_with(&tc, vec!["CFC.o".to_string()]);

        let links: Vec<_> = script.link_rules().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target(), format!("CFC{}", tc.module_suffix()));
        assert_eq!(script.target(), "CFC");
    }

    #[test]
    fn test_include_flags_declared_before_objects() {
        let script = script_with(
            &gcc(),
            vec!["CFC.o".to_string(), "../../../src/Foo.o".to_string()],
        );
        let text = script.render();

        let incflags = text.find("INCFLAGS =").unwrap();
        let objs = text.find("OBJS =").unwrap();
        assert!(incflags < objs);
        assert!(text.contains("    -I../../../include \\\n    -I../../../src\n"));
        assert!(text.contains("    CFC.o \\\n    ../../../src/Foo.o\n"));
    }

    #[test]
    fn test_wrapper_compile_rule() {
        let script = script_with(&gcc(), vec!["CFC.o".to_string()]);
        let compile = script
            .rules()
            .iter()
            .find(|r| r.kind() == RuleKind::Compile)
            .unwrap();

        assert_eq!(compile.target(), "CFC.o");
        assert_eq!(compile.prereqs(), ["$(srcdir)/CFC.c"]);
        assert_eq!(
            compile.commands(),
            ["$(CC) $(CFLAGS) -c $(srcdir)/CFC.c -o $@"]
        );
    }

    #[test]
    fn test_cflags_start_with_incflags() {
        let script = script_with(&gcc(), vec!["CFC.o".to_string()]);
        let cflags = script.vars().iter().find(|v| v.name() == "CFLAGS").unwrap();
        assert_eq!(cflags.elements()[0], "$(INCFLAGS)");
        assert_eq!(cflags.elements().last().unwrap(), "-O2");
    }

    #[test]
    fn test_render_is_deterministic() {
        let objects = vec!["CFC.o".to_string(), "../../../src/Foo.o".to_string()];
        let first = script_with(&gcc(), objects.clone());
        let second = script_with(&gcc(), objects);

        assert_eq!(first.render(), second.render());
        assert_eq!(first.content_hash(), second.content_hash());
        assert_eq!(first.inputs_fingerprint(), second.inputs_fingerprint());
    }

    #[test]
    fn test_posix_clean_rules() {
        let script = script_with(&gcc(), vec!["CFC.o".to_string()]);
        let text = script.render();

        assert!(text.contains("clean :\n\trm -f \\\n\t    CFC"));
        assert!(text.contains("distclean : clean\n\trm -f Makefile\n"));
        assert!(text.ends_with(".PHONY : all clean distclean\n"));
    }

    #[test]
    fn test_nmake_dialect() {
        let tc = MsvcToolchain::new(PathBuf::from("cl"));
        let script = script_with(&tc, vec!["CFC.obj".to_string()]);
        let text = script.render();

        assert_eq!(script.dialect(), MakeDialect::Nmake);
        assert!(text.contains("INCFLAGS = \\\n    /I../../../include \\\n    /I../../../src\n"));
        assert!(text.contains("CFC.obj : $(srcdir)/CFC.c\n"));
        assert!(text.contains("\tfor %i in (CFC.dll) do @if exist %i del /f %i\n"));
        assert!(!text.contains(".PHONY"));
    }

    #[test]
    fn test_paths_with_spaces_are_escaped() {
        let script =
            spaced_script(&gcc(), &["CFC.o", "my checkout/compiler/src/Foo.o"]).unwrap();
        let text = script.render();

        assert!(text.contains("srcdir = my\\ checkout/compiler/ruby/ext/Clownfish\n"));
        assert!(text.contains("    my\\ checkout/compiler/src/Foo.o\n"));
        assert!(text.contains("    -I\"my checkout/compiler/include\" \\\n"));
        assert!(text.contains("CFC.o : $(srcdir)/CFC.c\n"));
        assert!(text.contains("distclean : clean\n\trm -f Makefile\\ \\#1\n"));
        // Accessors keep the unescaped names
        assert_eq!(script.objects()[1], "my checkout/compiler/src/Foo.o");
    }

    #[test]
    fn test_nmake_quotes_paths_with_spaces() {
        let tc = MsvcToolchain::new(PathBuf::from("cl"));
        let script =
            spaced_script(&tc, &["CFC.obj", "my checkout/compiler/src/Foo.obj"]).unwrap();
        let text = script.render();

        assert!(text.contains("srcdir = my checkout/compiler/ruby/ext/Clownfish\n"));
        assert!(text.contains("    \"my checkout/compiler/src/Foo.obj\"\n"));
        assert!(text.contains("CFC.obj : \"$(srcdir)/CFC.c\"\n"));
    }

    #[test]
    fn test_unescapable_object_is_configuration_error() {
        let err = spaced_script(&gcc(), &["CFC.o", "$(HOME)/src/Foo.o"]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_summary() {
        let script = script_with(&gcc(), vec!["CFC.o".to_string()]);
        let summary = script.summary();

        assert_eq!(summary.target, "CFC");
        assert_eq!(summary.include_flags.len(), 2);
        assert_eq!(summary.objects, vec!["CFC.o"]);
        assert_eq!(summary.content_sha256, script.content_hash());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["dialect"], "posix");
    }
}
