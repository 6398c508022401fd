//! Discovery of pre-built objects to link into the extension.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::extension::ExtensionSpec;
use crate::util::fs::{list_files_with_suffix, relative_path, to_make_path};

/// The objects linked into the extension.
///
/// Always holds the wrapper object first, followed by every file in the
/// core source directory whose name ends in the object suffix, sorted by
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectManifest {
    wrapper: String,
    source_dir: PathBuf,
    suffix: String,
    discovered: Vec<PathBuf>,
}

impl ObjectManifest {
    /// Discover objects in `source_dir` (an absolute path).
    ///
    /// A missing directory yields a manifest with only the wrapper object;
    /// the link step is where that becomes an error.
    pub fn discover(spec: &ExtensionSpec, source_dir: &Path, suffix: &str) -> Result<Self> {
        let discovered = list_files_with_suffix(source_dir, suffix)?;
        tracing::debug!(
            "found {} `*{}` objects in {}",
            discovered.len(),
            suffix,
            source_dir.display()
        );

        Ok(ObjectManifest {
            wrapper: spec.wrapper_object(suffix),
            source_dir: source_dir.to_path_buf(),
            suffix: suffix.to_string(),
            discovered,
        })
    }

    /// Wrapper object file name, e.g. `CFC.o`.
    pub fn wrapper(&self) -> &str {
        &self.wrapper
    }

    /// Directory objects were discovered in.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Object suffix used for discovery.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Discovered objects (absolute paths), sorted by file name.
    pub fn discovered(&self) -> &[PathBuf] {
        &self.discovered
    }

    /// Total entries, wrapper included.
    pub fn len(&self) -> usize {
        self.discovered.len() + 1
    }

    /// A manifest always contains the wrapper object.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether any pre-built objects were found besides the wrapper.
    pub fn has_core_objects(&self) -> bool {
        !self.discovered.is_empty()
    }

    /// Entry file names, wrapper first.
    pub fn file_names(&self) -> Vec<String> {
        std::iter::once(self.wrapper.clone())
            .chain(self.discovered.iter().filter_map(|p| {
                p.file_name().map(|n| n.to_string_lossy().into_owned())
            }))
            .collect()
    }

    /// Entries as the build script names them, relative to `invocation_dir`.
    pub fn entries(&self, invocation_dir: &Path) -> Vec<String> {
        std::iter::once(self.wrapper.clone())
            .chain(
                self.discovered
                    .iter()
                    .map(|p| to_make_path(&relative_path(invocation_dir, p))),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cfc() -> ExtensionSpec {
        ExtensionSpec::new("CFC").unwrap()
    }

    #[test]
    fn test_wrapper_plus_matching_objects() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Foo.o"), "").unwrap();
        fs::write(src.join("Bar.o"), "").unwrap();
        fs::write(src.join("notes.txt"), "").unwrap();

        let manifest = ObjectManifest::discover(&cfc(), &src, ".o").unwrap();

        let names = manifest.file_names();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "CFC.o");
        assert!(names.contains(&"Foo.o".to_string()));
        assert!(names.contains(&"Bar.o".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_n_plus_one_entries() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for i in 0..5 {
            fs::write(src.join(format!("Obj{}.o", i)), "").unwrap();
        }
        for i in 0..3 {
            fs::write(src.join(format!("Src{}.c", i)), "").unwrap();
        }

        let manifest = ObjectManifest::discover(&cfc(), &src, ".o").unwrap();
        assert_eq!(manifest.len(), 6);
        assert!(manifest.has_core_objects());
    }

    #[test]
    fn test_missing_source_dir_gives_wrapper_only() {
        let tmp = TempDir::new().unwrap();
        let manifest = ObjectManifest::discover(&cfc(), &tmp.path().join("src"), ".o").unwrap();

        assert_eq!(manifest.file_names(), vec!["CFC.o"]);
        assert!(!manifest.has_core_objects());
    }

    #[test]
    fn test_entries_relative_to_invocation_dir() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let ext = tmp.path().join("ruby").join("ext");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&ext).unwrap();
        fs::write(src.join("Foo.o"), "").unwrap();

        let manifest = ObjectManifest::discover(&cfc(), &src, ".o").unwrap();
        assert_eq!(manifest.entries(&ext), vec!["CFC.o", "../../src/Foo.o"]);
    }

    #[test]
    fn test_suffix_is_exact() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Foo.obj"), "").unwrap();
        fs::write(src.join("Bar.o"), "").unwrap();

        let o = ObjectManifest::discover(&cfc(), &src, ".o").unwrap();
        assert_eq!(o.file_names(), vec!["CFC.o", "Bar.o"]);

        let obj = ObjectManifest::discover(&cfc(), &src, ".obj").unwrap();
        assert_eq!(obj.file_names(), vec!["CFC.obj", "Foo.obj"]);
    }
}
