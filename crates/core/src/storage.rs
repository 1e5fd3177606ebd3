//! AttachmentStore trait — where decoded attachment bytes live.
//!
//! The store is an explicit dependency of the materializer so that each
//! caller (or test) decides how attachment bytes are scoped.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// A byte store addressed by attachment name.
pub trait AttachmentStore: Send + Sync {
    /// Persist `bytes` under `name` and return the path they are addressable by.
    ///
    /// Writing a name that already exists overwrites it.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError>;

    /// Read at most `limit` bytes from the start of a stored blob.
    fn read_prefix(&self, path: &Path, limit: usize) -> Result<Vec<u8>, StorageError>;
}
