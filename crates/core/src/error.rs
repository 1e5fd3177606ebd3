//! Error types for the AppForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all AppForge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Remote generation errors ---
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    // --- Attachment errors ---
    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of a single call to the remote text generator.
///
/// All of these are recoverable: the retry controller counts them
/// against the attempt budget and moves on.
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by generator, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Failed to write attachment '{name}': {reason}")]
    Write { name: String, reason: String },

    #[error("Failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum AttachmentError {
    #[error("Attachment '{name}' is not an inline data URI")]
    NotInline { name: String },

    #[error("Malformed data URI for '{name}': {reason}")]
    MalformedDataUri { name: String, reason: String },

    #[error("Failed to decode '{name}': {reason}")]
    Decode { name: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
