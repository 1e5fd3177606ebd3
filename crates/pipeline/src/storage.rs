//! Attachment stores — filesystem and in-memory.
//!
//! `FsAttachmentStore` is what runs in production. Pointing two requests at
//! the same directory lets identically named attachments overwrite each
//! other; `FsAttachmentStore::per_request` avoids that by giving each
//! request its own subdirectory.

use appforge_core::error::StorageError;
use appforge_core::storage::AttachmentStore;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Reduce a name to a single path component, refusing anything else.
fn leaf_name(name: &str) -> Result<&str, StorageError> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| *n == name)
        .ok_or_else(|| StorageError::Write {
            name: name.into(),
            reason: "name must be a single path component".into(),
        })
}

/// Writes attachments as plain files in one directory.
#[derive(Debug, Clone)]
pub struct FsAttachmentStore {
    dir: PathBuf,
}

impl FsAttachmentStore {
    /// Store files directly in `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store files in a fresh `root/<uuid>/` directory.
    pub fn per_request(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(Uuid::new_v4().to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AttachmentStore for FsAttachmentStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let leaf = leaf_name(name)?;
        let write_err = |e: std::io::Error| StorageError::Write {
            name: name.into(),
            reason: e.to_string(),
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let path = self.dir.join(leaf);
        std::fs::write(&path, bytes).map_err(write_err)?;

        debug!(path = %path.display(), size = bytes.len(), "Attachment written");
        Ok(path)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> Result<Vec<u8>, StorageError> {
        let read_err = |e: std::io::Error| StorageError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let file = std::fs::File::open(path).map_err(read_err)?;
        let mut buf = Vec::with_capacity(limit.min(8 * 1024));
        file.take(limit as u64)
            .read_to_end(&mut buf)
            .map_err(read_err)?;
        Ok(buf)
    }
}

/// Keeps attachment bytes in memory under a virtual `mem://` root.
#[derive(Debug)]
pub struct MemoryAttachmentStore {
    root: PathBuf,
    blobs: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("mem://attachments"),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A copy of the bytes stored at `path`.
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentStore for MemoryAttachmentStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.root.join(leaf_name(name)?);
        self.lock().insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> Result<Vec<u8>, StorageError> {
        let blobs = self.lock();
        let bytes = blobs.get(path).ok_or_else(|| StorageError::Read {
            path: path.to_path_buf(),
            reason: "no such attachment".into(),
        })?;
        Ok(bytes[..bytes.len().min(limit)].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_writes_and_reads_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path().join("att"));

        let path = store.write("notes.txt", b"hello world").unwrap();
        assert_eq!(path, dir.path().join("att").join("notes.txt"));
        assert_eq!(store.read_prefix(&path, 5).unwrap(), b"hello");
        assert_eq!(store.read_prefix(&path, 500).unwrap(), b"hello world");
    }

    #[test]
    fn fs_store_overwrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());

        store.write("a.txt", b"first").unwrap();
        let path = store.write("a.txt", b"second").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn per_request_stores_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = FsAttachmentStore::per_request(dir.path());
        let b = FsAttachmentStore::per_request(dir.path());
        assert_ne!(a.dir(), b.dir());

        let pa = a.write("data.csv", b"a,b").unwrap();
        let pb = b.write("data.csv", b"c,d").unwrap();
        assert_eq!(std::fs::read(pa).unwrap(), b"a,b");
        assert_eq!(std::fs::read(pb).unwrap(), b"c,d");
    }

    #[test]
    fn fs_store_rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());
        assert!(store.write("../escape.txt", b"x").is_err());
        assert!(store.write("", b"x").is_err());
    }

    #[test]
    fn fs_store_read_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());
        let err = store
            .read_prefix(&dir.path().join("missing.txt"), 10)
            .unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryAttachmentStore::new();
        assert!(store.is_empty());

        let path = store.write("a.txt", b"hello").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&path).as_deref(), Some(&b"hello"[..]));
        assert_eq!(store.read_prefix(&path, 2).unwrap(), b"he");
    }

    #[test]
    fn memory_store_unknown_path_is_read_error() {
        let store = MemoryAttachmentStore::new();
        assert!(store.read_prefix(Path::new("mem://attachments/nope"), 10).is_err());
    }
}
