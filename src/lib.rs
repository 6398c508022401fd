//! extconf - build configurator for native extension modules
//!
//! This crate derives compiler include flags from a fixed relative directory
//! layout, discovers pre-built objects, and writes the Makefile that links
//! them into a loadable module. It also drives the external binding
//! compiler through its public contract.

pub mod binding;
pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::{BuildScript, CompilerFlags, ObjectManifest, Toolchain};
pub use crate::core::{ExtensionSpec, LayoutPreset, PathSet, RelativePath, RootRole};
pub use ops::{configure, ConfigureOptions, ConfigureOutcome};
pub use util::{Config, ConfigureError};
