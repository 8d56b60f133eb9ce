//! Attachment file lookup.
//!
//! Templates reference attachments by relative or absolute path; the lookup
//! collaborator resolves those paths to concrete files at send time. A path
//! that cannot be resolved is not an error at this level, the handler skips
//! the attachment.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A resolved attachment file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileHandle {
    /// File name used for the attachment header
    pub name: String,

    /// Absolute path of the file on disk
    pub path: PathBuf,
}

impl FileHandle {
    fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self { name, path }
    }
}

/// Resolves attachment paths to files.
pub trait FileLookup: Send + Sync {
    /// Resolve a path; `None` when no file exists for it
    fn get_file(&self, path: &str) -> Option<FileHandle>;
}

/// Filesystem-backed lookup.
///
/// Absolute paths are checked directly; relative paths are tried against
/// the include paths in order, first match wins.
pub struct FileSystemLookup {
    include_paths: Vec<PathBuf>,
}

impl FileSystemLookup {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self { include_paths }
    }

    fn existing_file(path: &Path) -> Option<PathBuf> {
        path.is_file().then(|| path.to_path_buf())
    }
}

impl FileLookup for FileSystemLookup {
    fn get_file(&self, path: &str) -> Option<FileHandle> {
        let path = Path::new(path);

        if path.is_absolute() {
            return Self::existing_file(path).map(FileHandle::from_path);
        }

        self.include_paths
            .iter()
            .find_map(|base| Self::existing_file(&base.join(path)))
            .map(FileHandle::from_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_resolved_against_include_paths() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("terms.pdf"), b"pdf").unwrap();

        let lookup =
            FileSystemLookup::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

        let file = lookup.get_file("terms.pdf").unwrap();
        assert_eq!(file.name, "terms.pdf");
        assert_eq!(file.path, second.path().join("terms.pdf"));
    }

    #[test]
    fn test_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png").unwrap();

        let lookup = FileSystemLookup::new(Vec::new());

        let file = lookup.get_file(path.to_str().unwrap()).unwrap();
        assert_eq!(file.name, "logo.png");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = FileSystemLookup::new(vec![dir.path().to_path_buf()]);

        assert!(lookup.get_file("absent.pdf").is_none());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let lookup = FileSystemLookup::new(vec![dir.path().to_path_buf()]);

        assert!(lookup.get_file("sub").is_none());
    }
}
