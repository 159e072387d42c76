//! Byte stores: where encoded images are read from and written to.
//!
//! The conversion engine never touches the filesystem. Everything that
//! persists bytes goes through a [`ByteStore`]:
//!
//! - [`LocalStore`] - `std::fs`, optionally creating parent directories
//! - [`MemoryStore`] - an in-process map guarded by an `RwLock`
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use that_io::{ByteStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.write_bytes(Path::new("frame.raw"), &[1, 2, 3]).unwrap();
//! assert_eq!(store.read_bytes(Path::new("frame.raw")).unwrap(), vec![1, 2, 3]);
//! ```

use crate::error::{IoError, IoResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// Reads and writes whole byte blobs by path.
pub trait ByteStore: Send + Sync {
    /// Reads every byte stored at `path`.
    fn read_bytes(&self, path: &Path) -> IoResult<Vec<u8>>;

    /// Replaces whatever is stored at `path` with `bytes`.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> IoResult<()>;

    /// Makes sure `path` can be written to, creating whatever containers
    /// the store needs. Flat stores have nothing to do.
    fn prepare_parent(&self, _path: &Path) -> IoResult<()> {
        Ok(())
    }
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore {
    create_dirs: bool,
}

impl LocalStore {
    /// A store that expects parent directories to exist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether missing parent directories are created on write.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

impl ByteStore for LocalStore {
    fn read_bytes(&self, path: &Path) -> IoResult<Vec<u8>> {
        trace!(path = %path.display(), "LocalStore::read_bytes");
        fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(path.to_path_buf()),
            _ => IoError::Io(e),
        })
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> IoResult<()> {
        trace!(path = %path.display(), bytes = bytes.len(), "LocalStore::write_bytes");
        if self.create_dirs {
            self.prepare_parent(path)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn prepare_parent(&self, path: &Path) -> IoResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// An in-memory store. Cheap to share between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a blob is stored at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

impl ByteStore for MemoryStore {
    fn read_bytes(&self, path: &Path) -> IoResult<Vec<u8>> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .cloned()
            .ok_or_else(|| IoError::NotFound(path.to_path_buf()))
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> IoResult<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_memory_store_missing() {
        let store = MemoryStore::new();
        let err = store.read_bytes(Path::new("missing.raw")).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_overwrite() {
        let store = MemoryStore::new();
        let path = Path::new("x.raw");
        store.write_bytes(path, &[1]).unwrap();
        store.write_bytes(path, &[2, 3]).unwrap();
        assert_eq!(store.read_bytes(path).unwrap(), vec![2, 3]);
        assert_eq!(store.len(), 1);
        assert!(store.contains(path));
    }

    #[test]
    fn test_memory_store_concurrent_writers() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let path = PathBuf::from(format!("img_{i}.raw"));
                    store.write_bytes(&path, &[i; 4]).unwrap();
                    store.read_bytes(&path).unwrap()
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), vec![i as u8; 4]);
        }
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_local_store_create_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.raw");

        let strict = LocalStore::new();
        assert!(strict.write_bytes(&path, &[1, 2]).is_err());

        let store = LocalStore::new().with_create_dirs(true);
        store.write_bytes(&path, &[1, 2]).unwrap();
        assert_eq!(store.read_bytes(&path).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_local_store_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalStore::new().read_bytes(&dir.path().join("nope.raw")).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }
}
