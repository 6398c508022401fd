//! Directory layout of an extension build.
//!
//! A [`PathSet`] names the roots an extension needs, each expressed relative
//! to the configurator's own location (the *anchor* directory) rather than to
//! wherever the tool happens to be invoked from.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::util::errors::ConfigureError;
use crate::util::fs::absolutize;

/// The role a root plays in the build.
///
/// Variants are declared in the order their include flags are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootRole {
    /// Public headers of the core runtime
    CoreInclude,
    /// Core sources; also where pre-built objects are discovered
    CoreSource,
    /// Host-language runtime sitting next to the core
    PeerRuntime,
    /// Headers produced by the binding compiler
    Autogen,
}

impl RootRole {
    /// All roles, in declaration order.
    pub const ALL: [RootRole; 4] = [
        RootRole::CoreInclude,
        RootRole::CoreSource,
        RootRole::PeerRuntime,
        RootRole::Autogen,
    ];
}

impl fmt::Display for RootRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RootRole::CoreInclude => "core include",
            RootRole::CoreSource => "core source",
            RootRole::PeerRuntime => "peer runtime",
            RootRole::Autogen => "autogen include",
        };
        f.write_str(s)
    }
}

/// A path of the form `../(../)*name(/name)*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Validate and wrap a layout root.
    pub fn parse(path: impl Into<PathBuf>) -> Result<Self, ConfigureError> {
        let path = path.into();
        let mut components = path.components().peekable();

        if !matches!(components.peek(), Some(Component::ParentDir)) {
            return Err(ConfigureError::configuration(format!(
                "layout root `{}` must start with `..`",
                path.display()
            )));
        }

        let mut named = 0usize;
        for component in components {
            match component {
                Component::ParentDir if named == 0 => {}
                Component::Normal(_) => named += 1,
                _ => {
                    return Err(ConfigureError::configuration(format!(
                        "layout root `{}` must be `..` segments followed by named components",
                        path.display()
                    )));
                }
            }
        }

        if named == 0 {
            return Err(ConfigureError::configuration(format!(
                "layout root `{}` has no named final component",
                path.display()
            )));
        }

        Ok(RelativePath(path))
    }

    /// The path as written.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Number of leading `..` segments.
    pub fn depth(&self) -> usize {
        self.0
            .components()
            .take_while(|c| matches!(c, Component::ParentDir))
            .count()
    }

    /// Resolve against the anchor directory.
    pub fn resolve(&self, anchor: &Path) -> PathBuf {
        absolutize(anchor, &self.0)
    }
}

impl FromStr for RelativePath {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelativePath::parse(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The set of roots needed to compile and link one extension.
///
/// Immutable once built; every consumer walks roots in [`RootRole`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSet {
    core_include: RelativePath,
    core_src: RelativePath,
    peer_runtime: Option<RelativePath>,
    autogen: Option<RelativePath>,
}

impl PathSet {
    /// Create a path set from the two mandatory roots.
    pub fn new(core_include: RelativePath, core_src: RelativePath) -> Self {
        PathSet {
            core_include,
            core_src,
            peer_runtime: None,
            autogen: None,
        }
    }

    /// Add a peer runtime root.
    pub fn with_peer_runtime(mut self, dir: RelativePath) -> Self {
        self.peer_runtime = Some(dir);
        self
    }

    /// Add an autogenerated-header root.
    pub fn with_autogen(mut self, dir: RelativePath) -> Self {
        self.autogen = Some(dir);
        self
    }

    /// Replace (or add) the root for a role.
    pub fn with_root(mut self, role: RootRole, dir: RelativePath) -> Self {
        match role {
            RootRole::CoreInclude => self.core_include = dir,
            RootRole::CoreSource => self.core_src = dir,
            RootRole::PeerRuntime => self.peer_runtime = Some(dir),
            RootRole::Autogen => self.autogen = Some(dir),
        }
        self
    }

    /// Look up the root for a role.
    pub fn get(&self, role: RootRole) -> Option<&RelativePath> {
        match role {
            RootRole::CoreInclude => Some(&self.core_include),
            RootRole::CoreSource => Some(&self.core_src),
            RootRole::PeerRuntime => self.peer_runtime.as_ref(),
            RootRole::Autogen => self.autogen.as_ref(),
        }
    }

    /// Present roots in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = (RootRole, &RelativePath)> + '_ {
        RootRole::ALL
            .into_iter()
            .filter_map(move |role| self.get(role).map(|path| (role, path)))
    }

    /// The directory searched for pre-built objects.
    pub fn core_src(&self) -> &RelativePath {
        &self.core_src
    }
}

/// Named layouts for the two packaging boundaries that share this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPreset {
    /// The binding compiler's own extension, `CFC`.
    #[default]
    Compiler,
    /// The runtime binding extension, `Bind`.
    Runtime,
}

impl LayoutPreset {
    /// Preset name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPreset::Compiler => "compiler",
            LayoutPreset::Runtime => "runtime",
        }
    }

    /// Default link target for the preset.
    pub fn target_name(&self) -> &'static str {
        match self {
            LayoutPreset::Compiler => "CFC",
            LayoutPreset::Runtime => "Bind",
        }
    }

    /// The preset's roots.
    pub fn path_set(&self) -> PathSet {
        match self {
            LayoutPreset::Compiler => {
                PathSet::new(preset_root("../../../include"), preset_root("../../../src"))
            }
            LayoutPreset::Runtime => PathSet::new(
                preset_root("../../../../compiler/include"),
                preset_root("../../../../compiler/src"),
            )
            .with_peer_runtime(preset_root("../../../core"))
            .with_autogen(preset_root("../../../autogen/include")),
        }
    }
}

fn preset_root(path: &str) -> RelativePath {
    RelativePath(PathBuf::from(path))
}

impl FromStr for LayoutPreset {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compiler" | "cfc" => Ok(LayoutPreset::Compiler),
            "runtime" | "bind" => Ok(LayoutPreset::Runtime),
            _ => Err(ConfigureError::configuration(format!(
                "unknown layout `{}`; expected `compiler` or `runtime`",
                s
            ))),
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
