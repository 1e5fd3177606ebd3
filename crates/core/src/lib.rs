//! # AppForge Core
//!
//! Domain types, traits, and error definitions for the AppForge generation
//! pipeline. This crate has **zero framework dependencies**: it defines the
//! domain model that the other crates implement against.
//!
//! The two seams are traits:
//! - [`TextGenerator`] — the remote text-generation service
//! - [`AttachmentStore`] — where decoded attachment bytes are kept

pub mod attachment;
pub mod error;
pub mod generator;
pub mod request;
pub mod result;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use attachment::{Attachment, MaterializedAttachment};
pub use error::{AttachmentError, Error, GeneratorError, Result, StorageError};
pub use generator::TextGenerator;
pub use request::GenerationRequest;
pub use result::{GeneratedFiles, GenerationResult, INDEX_HTML, ParsedResponse, README_MD};
pub use storage::AttachmentStore;
