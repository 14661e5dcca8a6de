//! Source handles and resolvers
//!
//! A [`SourceHandle`] is a deferred reference to the tabular asset backing a
//! domain. Nothing is read until the table is first needed; at that point a
//! [`SourceResolver`] turns the handle's path into raw bytes.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::loader::{LoadError, LoadResult};

/// Deferred reference to a domain's tabular asset
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SourceHandle {
    path: Option<String>,
}

impl SourceHandle {
    /// A handle that was never assigned
    pub fn unset() -> Self {
        Self { path: None }
    }

    /// Create from a path (not yet resolved)
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.trim().is_empty() {
            return Self::unset();
        }
        Self { path: Some(path) }
    }

    /// Get the path
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Check if a path was assigned
    pub fn is_set(&self) -> bool {
        self.path.is_some()
    }

    /// Check whether a changed file on disk is the one this handle names
    pub fn refers_to(&self, changed: &Path) -> bool {
        match &self.path {
            Some(path) => normalize_path(changed).ends_with(normalize_path(Path::new(path))),
            None => false,
        }
    }
}

/// Lexically drop `.` components and resolve `..` against the preceding one
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

impl From<Option<String>> for SourceHandle {
    fn from(path: Option<String>) -> Self {
        path.map(Self::from_path).unwrap_or_default()
    }
}

impl core::fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "SourceHandle({})", path),
            None => write!(f, "SourceHandle(<unset>)"),
        }
    }
}

/// Turns a source path into raw table bytes
pub trait SourceResolver: Send + Sync {
    /// Resolve a path. A missing asset is `LoadError::NotFound`.
    fn resolve(&self, path: &str) -> LoadResult<Vec<u8>>;
}

impl<R: SourceResolver + ?Sized> SourceResolver for Arc<R> {
    fn resolve(&self, path: &str) -> LoadResult<Vec<u8>> {
        (**self).resolve(path)
    }
}

impl<R: SourceResolver + ?Sized> SourceResolver for Box<R> {
    fn resolve(&self, path: &str) -> LoadResult<Vec<u8>> {
        (**self).resolve(path)
    }
}

/// Resolves paths against a data directory on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    /// Create a resolver rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Base data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path for a source path; absolute paths are used as-is
    pub fn full_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

impl SourceResolver for FileSource {
    fn resolve(&self, path: &str) -> LoadResult<Vec<u8>> {
        let full_path = self.full_path(path);
        std::fs::read(&full_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(full_path.display().to_string()),
            _ => LoadError::Io(e),
        })
    }
}

/// In-memory sources, editable while the cache is live
#[derive(Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), data.into());
    }

    /// Builder-style insert
    pub fn with_file(self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Remove a file
    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(path).is_some()
    }

    /// Number of files held
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl SourceResolver for MemorySource {
    fn resolve(&self, path: &str) -> LoadResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_unset() {
        let handle = SourceHandle::unset();
        assert!(!handle.is_set());
        assert_eq!(handle.path(), None);

        assert!(!SourceHandle::from_path("  ").is_set());
        assert!(!SourceHandle::from(None).is_set());
    }

    #[test]
    fn test_handle_refers_to() {
        let handle = SourceHandle::from_path("tables/DT_HitStop.json");
        assert!(handle.refers_to(Path::new("/game/data/tables/DT_HitStop.json")));
        assert!(!handle.refers_to(Path::new("/game/data/DT_HitStop.json")));
        assert!(!SourceHandle::unset().refers_to(Path::new("DT_HitStop.json")));
    }

    #[test]
    fn test_handle_refers_to_dotted_paths() {
        let changed = Path::new("/game/data/DT_HitStop.json");
        assert!(SourceHandle::from_path("./DT_HitStop.json").refers_to(changed));
        assert!(SourceHandle::from_path("sub/../DT_HitStop.json").refers_to(changed));
        assert!(SourceHandle::from_path("./tables/./../DT_HitStop.json").refers_to(changed));
        assert!(!SourceHandle::from_path("./DT_Knockback.json").refers_to(changed));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_file("a.json", "[]");
        assert_eq!(source.resolve("a.json").unwrap(), b"[]");
        assert!(matches!(source.resolve("b.json"), Err(LoadError::NotFound(_))));

        assert!(source.remove("a.json"));
        assert!(source.is_empty());
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path());

        assert!(matches!(source.resolve("nope.json"), Err(LoadError::NotFound(_))));

        std::fs::write(dir.path().join("yes.json"), "[]").unwrap();
        assert_eq!(source.resolve("yes.json").unwrap(), b"[]");
    }
}
