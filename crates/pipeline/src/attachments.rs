//! Attachment materializer — decodes inline attachments into a store.
//!
//! Only `data:` URIs are materialized; anything else is skipped silently.
//! A single bad attachment is logged and skipped, never failing the batch.

use appforge_core::attachment::{Attachment, DATA_URI_SCHEME, MaterializedAttachment};
use appforge_core::error::AttachmentError;
use appforge_core::storage::AttachmentStore;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bytes read for a text preview, and the character cap applied afterwards.
pub const PREVIEW_LIMIT: usize = 500;

/// Name used when an attachment arrives without one.
pub const DEFAULT_ATTACHMENT_NAME: &str = "attachment";

/// Extensions previewed as text regardless of MIME type.
const TEXT_EXTENSIONS: &[&str] = &[".md", ".txt", ".json", ".csv"];

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Parse `data:<mime>[;params],<base64>`.
///
/// The payload is always base64-decoded; ASCII whitespace inside it is ignored.
pub fn parse_data_uri(name: &str, url: &str) -> Result<DataUri, AttachmentError> {
    let rest = url
        .strip_prefix(DATA_URI_SCHEME)
        .ok_or_else(|| AttachmentError::NotInline { name: name.into() })?;

    let (header, payload) =
        rest.split_once(',').ok_or_else(|| AttachmentError::MalformedDataUri {
            name: name.into(),
            reason: "missing ',' between header and payload".into(),
        })?;

    let mime = header.split(';').next().unwrap_or_default().trim().to_string();

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AttachmentError::Decode {
            name: name.into(),
            reason: e.to_string(),
        })?;

    Ok(DataUri { mime, bytes })
}

/// The name an attachment is recorded and stored under.
fn display_name(attachment: &Attachment) -> &str {
    if attachment.name.is_empty() {
        DEFAULT_ATTACHMENT_NAME
    } else {
        &attachment.name
    }
}

/// The final path component of `name`, so stores never see directories.
fn storage_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ATTACHMENT_NAME)
}

fn is_text_like(attachment: &MaterializedAttachment) -> bool {
    attachment.mime.starts_with("text")
        || TEXT_EXTENSIONS
            .iter()
            .any(|ext| attachment.name.ends_with(ext))
}

/// Decodes attachments into an injected store and summarizes them for prompts.
pub struct AttachmentMaterializer {
    store: Arc<dyn AttachmentStore>,
}

impl AttachmentMaterializer {
    pub fn new(store: Arc<dyn AttachmentStore>) -> Self {
        Self { store }
    }

    /// Materialize every inline attachment, skipping the rest.
    pub fn materialize(&self, attachments: &[Attachment]) -> Vec<MaterializedAttachment> {
        attachments
            .iter()
            .filter(|att| att.is_inline())
            .filter_map(|att| match self.materialize_one(att) {
                Ok(materialized) => Some(materialized),
                Err(e) => {
                    warn!(name = %display_name(att), error = %e, "Failed to decode attachment");
                    None
                }
            })
            .collect()
    }

    /// Decode and store a single attachment.
    pub fn materialize_one(
        &self,
        attachment: &Attachment,
    ) -> Result<MaterializedAttachment, AttachmentError> {
        let name = display_name(attachment);
        let DataUri { mime, bytes } = parse_data_uri(name, &attachment.url)?;
        let path = self.store.write(storage_name(name), &bytes)?;

        debug!(name, mime = %mime, size = bytes.len(), "Attachment materialized");

        Ok(MaterializedAttachment {
            name: name.to_string(),
            path,
            mime,
            size: bytes.len(),
        })
    }

    /// One line per attachment: a text preview, or just the size.
    pub fn summarize_previews(&self, attachments: &[MaterializedAttachment]) -> String {
        attachments
            .iter()
            .map(|att| self.preview_line(att))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn preview_line(&self, att: &MaterializedAttachment) -> String {
        if !is_text_like(att) {
            return format!("- {} ({}): {} bytes", att.name, att.mime, att.size);
        }

        match self.store.read_prefix(&att.path, PREVIEW_LIMIT) {
            Ok(bytes) => {
                let preview: String = String::from_utf8_lossy(&bytes)
                    .chars()
                    .filter(|c| *c != char::REPLACEMENT_CHARACTER)
                    .collect::<String>()
                    .replace('\n', "\\n")
                    .chars()
                    .take(PREVIEW_LIMIT)
                    .collect();
                format!("- {} ({}): preview: {}", att.name, att.mime, preview)
            }
            Err(e) => format!(
                "- {} ({}): (could not read preview: {})",
                att.name, att.mime, e
            ),
        }
    }
}
