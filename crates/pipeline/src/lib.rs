//! The AppForge generation pipeline.
//!
//! Turns a brief, optional attachments, and evaluation checks into two
//! artifacts, `index.html` and `README.md`, through a single
//! call-and-validate cycle against a remote text generator:
//!
//! 1. **Attachments** — inline data URIs decoded into an injected store
//! 2. **Prompt** — one structured instruction payload
//! 3. **Retry** — bounded attempts, each gated on marker and README quality
//! 4. **Fallback** — deterministic artifacts when every attempt falls short
//!
//! [`Pipeline::generate`] always returns a complete [`GenerationResult`].

pub mod attachments;
pub mod fallback;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod retry;
pub mod storage;

pub use appforge_core::{
    Attachment, GeneratedFiles, GenerationRequest, GenerationResult, MaterializedAttachment,
};
pub use attachments::AttachmentMaterializer;
pub use orchestrator::{AttachmentScope, Pipeline, generate_app_code};
pub use response::README_MARKER;
pub use retry::{AttemptOutcome, RetryController, RetryPolicy, RetryReport};
pub use storage::{FsAttachmentStore, MemoryAttachmentStore};
