//! Core data structures for extconf.
//!
//! - Layout roots relative to the configurator (`PathSet`)
//! - The extension being built (`ExtensionSpec`)

pub mod extension;
pub mod layout;

pub use extension::ExtensionSpec;
pub use layout::{LayoutPreset, PathSet, RelativePath, RootRole};
