//! High-level operations.
//!
//! This module contains the implementation of extconf commands.

pub mod check;
pub mod clean;
pub mod configure;
pub mod generate;

pub use check::{check, format_report, CheckReport, RootStatus};
pub use clean::clean;
pub use configure::{
    configure, load_project_config, plan_build_script, plan_build_script_with, ConfigureOptions,
    ConfigureOutcome, ConfigurePlan, ScriptSettings,
};
pub use generate::{generate, GenerateOptions};
