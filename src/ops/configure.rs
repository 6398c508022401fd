//! Implementation of `extconf configure`.
//!
//! Configuring is a single pass: resolve the layout, derive include flags,
//! discover pre-built objects, render the Makefile, write it. No root is
//! validated here. A missing directory or an empty object list surfaces
//! later, when make runs; `extconf check` predicts both.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::builder::discovery::ObjectManifest;
use crate::builder::flags::CompilerFlags;
use crate::builder::makefile::{BuildScript, BuildScriptInput, BUILD_SCRIPT_NAME};
use crate::builder::toolchain::{detect_toolchain, HostEnv, Toolchain};
use crate::core::extension::ExtensionSpec;
use crate::core::layout::{LayoutPreset, PathSet, RelativePath, RootRole};
use crate::util::config::{load_config, project_config_path, Config, PathsConfig, ToolchainSettings};
use crate::util::errors::ConfigureError;
use crate::util::fs::{absolutize, relative_path, to_make_path, write_string};
use crate::util::hash::file_has_hash;

/// Options for configuring an extension.
///
/// Explicit fields override `config`, which overrides the layout preset.
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Directory the layout is relative to (where the wrapper source lives)
    pub anchor: PathBuf,
    /// Directory the Makefile is consumed from
    pub invocation_dir: PathBuf,
    pub layout: Option<LayoutPreset>,
    pub target: Option<String>,
    pub wrapper_source: Option<PathBuf>,
    /// Per-root overrides
    pub paths: PathsConfig,
    /// Compiler, object suffix and extra flags
    pub toolchain: ToolchainSettings,
    /// Where to write the Makefile (default: `<invocation_dir>/Makefile`)
    pub out: Option<PathBuf>,
    pub env: HostEnv,
    /// Merged configuration files
    pub config: Config,
}

impl ConfigureOptions {
    /// Options with nothing overridden.
    pub fn new(anchor: impl Into<PathBuf>, invocation_dir: impl Into<PathBuf>) -> Self {
        ConfigureOptions {
            anchor: anchor.into(),
            invocation_dir: invocation_dir.into(),
            ..Default::default()
        }
    }

    /// Path the Makefile is written to.
    pub fn script_path(&self) -> PathBuf {
        match &self.out {
            Some(out) => absolutize(&self.invocation_dir, out),
            None => self.invocation_dir.join(BUILD_SCRIPT_NAME),
        }
    }
}

/// Load `extconf.toml` from the anchor merged over the global config.
pub fn load_project_config(anchor: &Path, global: Option<&Path>) -> Result<Config, ConfigureError> {
    let project = project_config_path(anchor);
    load_config(global, &project).map_err(|e| ConfigureError::configuration(format!("{:#}", e)))
}

/// Everything configure decided before touching the filesystem.
pub struct ConfigurePlan {
    pub preset: LayoutPreset,
    pub spec: ExtensionSpec,
    pub roots: PathSet,
    pub toolchain: Box<dyn Toolchain>,
    pub anchor: PathBuf,
    pub invocation_dir: PathBuf,
    pub script_path: PathBuf,
    cflags: Vec<String>,
    ldflags: Vec<String>,
}

impl std::fmt::Debug for ConfigurePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurePlan")
            .field("preset", &self.preset)
            .field("spec", &self.spec)
            .field("roots", &self.roots)
            .field("compiler", &self.toolchain.compiler_path())
            .field("script_path", &self.script_path)
            .finish()
    }
}

impl ConfigurePlan {
    /// Resolve layout, extension and toolchain from the options.
    pub fn resolve(opts: &ConfigureOptions) -> Result<Self, ConfigureError> {
        let preset = match (opts.layout, &opts.config.extension.layout) {
            (Some(preset), _) => preset,
            (None, Some(name)) => name.parse()?,
            (None, None) => LayoutPreset::default(),
        };

        let target = opts
            .target
            .clone()
            .or_else(|| opts.config.extension.target.clone())
            .unwrap_or_else(|| preset.target_name().to_string());
        let mut spec = ExtensionSpec::new(target)?;
        let wrapper = opts
            .wrapper_source
            .clone()
            .or_else(|| opts.config.extension.wrapper_source.clone().map(PathBuf::from));
        if let Some(wrapper) = wrapper {
            spec = spec.with_wrapper_source(wrapper)?;
        }

        let roots = apply_path_overrides(
            apply_path_overrides(preset.path_set(), &opts.config.paths)?,
            &opts.paths,
        )?;

        let toolchain = detect_toolchain(&opts.toolchain, &opts.config.toolchain, &opts.env)?;

        let cflags = if opts.toolchain.cflags.is_empty() {
            opts.config.toolchain.cflags.clone()
        } else {
            opts.toolchain.cflags.clone()
        };
        let ldflags = if opts.toolchain.ldflags.is_empty() {
            opts.config.toolchain.ldflags.clone()
        } else {
            opts.toolchain.ldflags.clone()
        };

        tracing::debug!(
            "configuring `{}` with the {} layout",
            spec.target(),
            preset
        );

        Ok(ConfigurePlan {
            preset,
            spec,
            roots,
            toolchain,
            anchor: opts.anchor.clone(),
            invocation_dir: opts.invocation_dir.clone(),
            script_path: opts.script_path(),
            cflags,
            ldflags,
        })
    }

    /// Include flags, rendered relative to the invocation directory.
    pub fn flags(&self) -> CompilerFlags {
        CompilerFlags::from_path_set(
            &self.roots,
            &self.anchor,
            &self.invocation_dir,
            self.toolchain.as_ref(),
        )
    }

    /// Absolute directory searched for pre-built objects.
    pub fn object_dir(&self) -> PathBuf {
        self.roots.core_src().resolve(&self.anchor)
    }

    /// Discover the objects to link.
    pub fn discover(&self) -> Result<ObjectManifest, ConfigureError> {
        ObjectManifest::discover(
            &self.spec,
            &self.object_dir(),
            self.toolchain.object_suffix(),
        )
        .map_err(|e| ConfigureError::configuration(format!("{:#}", e)))
    }

    /// Render the build script without writing it.
    pub fn build_script(&self) -> Result<BuildScript, ConfigureError> {
        let file_name = script_name(&self.invocation_dir, &self.script_path);

        plan_build_script_with(
            &self.roots,
            &self.spec,
            self.toolchain.as_ref(),
            &self.anchor,
            &self.invocation_dir,
            &ScriptSettings {
                cflags: &self.cflags,
                ldflags: &self.ldflags,
                file_name: &file_name,
            },
        )
    }
}

fn apply_path_overrides(mut roots: PathSet, paths: &PathsConfig) -> Result<PathSet, ConfigureError> {
    let overrides = [
        (RootRole::CoreInclude, &paths.core_include),
        (RootRole::CoreSource, &paths.core_src),
        (RootRole::PeerRuntime, &paths.peer_runtime),
        (RootRole::Autogen, &paths.autogen),
    ];

    for (role, path) in overrides {
        if let Some(path) = path {
            roots = roots.with_root(role, RelativePath::parse(path.clone())?);
        }
    }
    Ok(roots)
}

fn script_name(invocation_dir: &Path, script_path: &Path) -> String {
    to_make_path(&relative_path(invocation_dir, script_path))
}

/// What a build script carries besides the layout.
#[derive(Debug, Clone, Copy)]
pub struct ScriptSettings<'a> {
    pub cflags: &'a [String],
    pub ldflags: &'a [String],
    /// Name the script is written under, relative to the invocation dir
    pub file_name: &'a str,
}

impl Default for ScriptSettings<'_> {
    fn default() -> Self {
        ScriptSettings {
            cflags: &[],
            ldflags: &[],
            file_name: BUILD_SCRIPT_NAME,
        }
    }
}

/// Render the build script for a layout.
///
/// This is configure without the final write: roots are resolved against
/// `anchor` and everything the script names is relative to `invocation_dir`.
pub fn plan_build_script(
    roots: &PathSet,
    spec: &ExtensionSpec,
    toolchain: &dyn Toolchain,
    anchor: &Path,
    invocation_dir: &Path,
) -> Result<BuildScript, ConfigureError> {
    plan_build_script_with(
        roots,
        spec,
        toolchain,
        anchor,
        invocation_dir,
        &ScriptSettings::default(),
    )
}

/// [`plan_build_script`] with extra flags and a custom file name.
pub fn plan_build_script_with(
    roots: &PathSet,
    spec: &ExtensionSpec,
    toolchain: &dyn Toolchain,
    anchor: &Path,
    invocation_dir: &Path,
    settings: &ScriptSettings<'_>,
) -> Result<BuildScript, ConfigureError> {
    let flags = CompilerFlags::from_path_set(roots, anchor, invocation_dir, toolchain);
    let manifest = ObjectManifest::discover(
        spec,
        &roots.core_src().resolve(anchor),
        toolchain.object_suffix(),
    )
    .map_err(|e| ConfigureError::configuration(format!("{:#}", e)))?;

    BuildScript::assemble(
        &BuildScriptInput {
            spec,
            flags: &flags,
            objects: manifest.entries(invocation_dir),
            srcdir: to_make_path(&relative_path(invocation_dir, anchor)),
            cflags: settings.cflags,
            ldflags: settings.ldflags,
            file_name: settings.file_name,
        },
        toolchain,
    )
}

/// Result of a configure run.
#[derive(Debug, Clone)]
pub struct ConfigureOutcome {
    pub script: BuildScript,
    /// Where the script was written
    pub path: PathBuf,
    /// Whether the file on disk changed
    pub changed: bool,
}

/// Configure the extension and write its Makefile.
///
/// The file is left untouched when its content would not change.
pub fn configure(opts: &ConfigureOptions) -> Result<ConfigureOutcome, ConfigureError> {
    let plan = ConfigurePlan::resolve(opts)?;
    let script = plan.build_script()?;
    let path = plan.script_path;

    let changed = write_if_changed(&path, &script)
        .map_err(|e| ConfigureError::configuration(format!("{:#}", e)))?;

    if changed {
        tracing::info!("wrote {}", path.display());
    } else {
        tracing::info!("{} is up to date", path.display());
    }

    Ok(ConfigureOutcome {
        script,
        path,
        changed,
    })
}

fn write_if_changed(path: &Path, script: &BuildScript) -> anyhow::Result<bool> {
    if path.is_file() && file_has_hash(path, &script.content_hash())? {
        return Ok(false);
    }
    write_string(path, &script.render())
        .with_context(|| format!("cannot write build script for `{}`", script.target()))?;
    Ok(true)
}
