//! Command implementations

pub mod check;
pub mod clean;
pub mod completions;
pub mod configure;
pub mod flags;
pub mod generate;
pub mod objects;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::LayoutArgs;
use extconf::builder::HostEnv;
use extconf::ops::{load_project_config, ConfigureOptions};
use extconf::util::config::{global_config_path, PathsConfig, ToolchainSettings};
use extconf::util::fs::absolutize;

/// The directory extconf was invoked from.
pub fn invocation_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to determine current directory")
}

/// Build configure options from command-line arguments, the config files
/// and the environment.
pub fn configure_options(args: &LayoutArgs, out: Option<&Path>) -> Result<ConfigureOptions> {
    let cwd = invocation_dir()?;
    let anchor = match &args.anchor {
        Some(anchor) => absolutize(&cwd, anchor),
        None => cwd.clone(),
    };

    let global = global_config_path();
    let config = load_project_config(&anchor, global.as_deref())?;

    Ok(ConfigureOptions {
        anchor,
        invocation_dir: cwd,
        layout: args.layout,
        target: args.target.clone(),
        wrapper_source: args.wrapper_source.clone(),
        paths: PathsConfig {
            core_include: args.core_include.clone(),
            core_src: args.core_src.clone(),
            peer_runtime: args.peer_runtime.clone(),
            autogen: args.autogen.clone(),
        },
        toolchain: ToolchainSettings {
            cc: args.cc.clone(),
            obj_ext: args.obj_ext.clone(),
            cflags: args.cflags.clone(),
            ldflags: args.ldflags.clone(),
        },
        out: out.map(Path::to_path_buf),
        env: HostEnv::capture(),
        config,
    })
}
