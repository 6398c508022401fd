//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Remove a file if it exists. Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.is_file() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// List the files directly inside `dir` whose names end in `suffix`.
///
/// Results are sorted by file name. A missing directory yields an empty list.
pub fn list_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(suffix)
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut results = Vec::new();
    for entry in glob_with(&pattern, options)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    results.dedup();
    Ok(results)
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// Roots may not exist yet, so `canonicalize` is not an option. Leading `..`
/// components of a relative path are preserved.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Make `path` absolute against `base` and normalize it lexically.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    match pathdiff::diff_paths(path, base) {
        Some(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Some(rel) => rel,
        None => path.to_path_buf(),
    }
}

/// Render a path with forward slashes, as make expects.
pub fn to_make_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_with_suffix() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Foo.o"), "").unwrap();
        fs::write(src.join("Bar.o"), "").unwrap();
        fs::write(src.join("notes.txt"), "notes").unwrap();
        fs::write(src.join("Baz.obj"), "").unwrap();
        fs::create_dir_all(src.join("nested.o")).unwrap();

        let files = list_files_with_suffix(&src, ".o").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Bar.o", "Foo.o"]);
    }

    #[test]
    fn test_list_files_with_suffix_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let files = list_files_with_suffix(&tmp.path().join("absent"), ".o").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_files_escapes_directory_name() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src[1]");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.o"), "").unwrap();

        let files = list_files_with_suffix(&src, ".o").unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/c/../../d")),
            PathBuf::from("/a/d")
        );
        assert_eq!(
            normalize_lexically(Path::new("../../include")),
            PathBuf::from("../../include")
        );
        assert_eq!(normalize_lexically(Path::new("a/./b/..")), PathBuf::from("a"));
        assert_eq!(normalize_lexically(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_path() {
        let base = Path::new("/work/ext/Clownfish");
        assert_eq!(
            relative_path(base, Path::new("/work/include")),
            PathBuf::from("../../include")
        );
        assert_eq!(relative_path(base, base), PathBuf::from("."));
    }

    #[test]
    fn test_remove_file_if_exists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        assert!(!remove_file_if_exists(&path).unwrap());

        fs::write(&path, "all :\n").unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
