//! Configuration file support for extconf.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.extconf/config.toml` - User-wide toolchain defaults
//! - Project: `extconf.toml` next to the configurator (the anchor directory)
//!
//! Project config takes precedence over global config. A project file that
//! fails to parse is an error; a broken global file is ignored with a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "extconf.toml";

/// extconf configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extension settings
    pub extension: ExtensionConfig,

    /// Layout root overrides
    pub paths: PathsConfig,

    /// Toolchain settings
    pub toolchain: ToolchainSettings,
}

/// Which extension is being built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Link target name (e.g. `CFC`, `Bind`)
    pub target: Option<String>,

    /// Layout preset (`compiler` or `runtime`)
    pub layout: Option<String>,

    /// Wrapper C source, relative to the anchor directory
    pub wrapper_source: Option<String>,
}

/// Anchor-relative layout roots. Any value set here replaces the preset's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub core_include: Option<PathBuf>,
    pub core_src: Option<PathBuf>,
    pub peer_runtime: Option<PathBuf>,
    pub autogen: Option<PathBuf>,
}

/// Toolchain settings for the generated build script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Object file suffix including the dot (e.g., `.o`)
    pub obj_ext: Option<String>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Extension settings
        if other.extension.target.is_some() {
            self.extension.target = other.extension.target;
        }
        if other.extension.layout.is_some() {
            self.extension.layout = other.extension.layout;
        }
        if other.extension.wrapper_source.is_some() {
            self.extension.wrapper_source = other.extension.wrapper_source;
        }

        // Paths
        if other.paths.core_include.is_some() {
            self.paths.core_include = other.paths.core_include;
        }
        if other.paths.core_src.is_some() {
            self.paths.core_src = other.paths.core_src;
        }
        if other.paths.peer_runtime.is_some() {
            self.paths.peer_runtime = other.paths.peer_runtime;
        }
        if other.paths.autogen.is_some() {
            self.paths.autogen = other.paths.autogen;
        }

        // Toolchain settings
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.obj_ext.is_some() {
            self.toolchain.obj_ext = other.toolchain.obj_ext;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`<anchor>/extconf.toml`)
/// 2. Global config (`~/.extconf/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path {
        if global.exists() {
            config.merge(Config::load_or_default(global));
        }
    }

    if project_path.exists() {
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global extconf config directory (~/.extconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".extconf"))
}

/// Get the global config path (~/.extconf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path for an anchor directory.
pub fn project_config_path(anchor: &Path) -> PathBuf {
    anchor.join(PROJECT_CONFIG_FILE)
}
