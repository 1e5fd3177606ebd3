//! TextGenerator trait — the abstraction over the remote text-generation service.
//!
//! A generator takes one fully assembled prompt and returns free-form text,
//! or fails. It keeps no state between calls; retrying and validating the
//! returned text is the pipeline's job, not the generator's.

use async_trait::async_trait;
use crate::error::GeneratorError;

/// The remote text generator seam.
///
/// The pipeline calls `complete()` once per attempt without knowing which
/// backend is behind it. Tests substitute scripted or prompt-capturing stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// A human-readable name for this generator (e.g., "aipipe").
    fn name(&self) -> &str;

    /// Send a prompt and return the generated text.
    ///
    /// An empty string is a valid response; it surfaces downstream as a
    /// missing-marker attempt rather than an error.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GeneratorError>;
}
