//! Pipeline outputs.

use crate::attachment::MaterializedAttachment;
use serde::{Deserialize, Serialize};

/// Output key of the application artifact.
pub const INDEX_HTML: &str = "index.html";

/// Output key of the document artifact.
pub const README_MD: &str = "README.md";

/// A raw response split into its two logical sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub code_section: String,
    pub document_section: String,
}

/// The two generated files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFiles {
    #[serde(rename = "index.html")]
    pub index_html: String,

    #[serde(rename = "README.md")]
    pub readme: String,
}

impl GeneratedFiles {
    /// Look a file up by its output key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            INDEX_HTML => Some(&self.index_html),
            README_MD => Some(&self.readme),
            _ => None,
        }
    }
}

/// The sole output of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub files: GeneratedFiles,
    pub attachments: Vec<MaterializedAttachment>,
}
