//! Attachment value objects.
//!
//! An `Attachment` is what the caller hands in: a name and a URL that is
//! usually an inline `data:` URI. A `MaterializedAttachment` is what the
//! pipeline hands back after decoding the payload into a store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The URI scheme prefix for inline attachments.
pub const DATA_URI_SCHEME: &str = "data:";

/// An attachment as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name (e.g., "data.csv")
    #[serde(default)]
    pub name: String,

    /// Inline data URI (`data:<mime>;base64,<payload>`) or any other URL
    #[serde(default)]
    pub url: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Whether the URL carries its payload inline.
    pub fn is_inline(&self) -> bool {
        self.url.starts_with(DATA_URI_SCHEME)
    }
}

/// A decoded attachment persisted in an `AttachmentStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedAttachment {
    pub name: String,

    /// Where the store put the bytes
    pub path: PathBuf,

    /// MIME type from the data URI header (may be empty)
    pub mime: String,

    /// Decoded size in bytes
    pub size: usize,
}
