//! Implementation of `extconf clean`.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::remove_file_if_exists;

/// Remove a generated build script. Returns whether a file was removed.
pub fn clean(path: &Path) -> Result<bool> {
    let removed = remove_file_if_exists(path)?;
    if removed {
        tracing::info!("removed {}", path.display());
    } else {
        tracing::debug!("nothing to clean at {}", path.display());
    }
    Ok(removed)
}
