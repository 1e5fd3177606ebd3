//! Pipeline orchestrator — the end-to-end `generate` contract.
//!
//! materialize attachments → assemble prompt → retry controller →
//! split and strip, or fall back → `GenerationResult`.
//!
//! `generate` cannot fail: every failure mode below it is turned into a
//! typed outcome and ends in either remote content or fallback content.

use crate::attachments::AttachmentMaterializer;
use crate::fallback::{fallback_code, fallback_document, synthesize_fallback};
use crate::prompt;
use crate::response::{split_stripped, strip_fences};
use crate::retry::{RetryController, RetryPolicy};
use crate::storage::FsAttachmentStore;
use appforge_config::{ConfigError, PipelineConfig};
use appforge_core::attachment::Attachment;
use appforge_core::generator::TextGenerator;
use appforge_core::request::GenerationRequest;
use appforge_core::result::{GeneratedFiles, GenerationResult};
use appforge_core::storage::AttachmentStore;
use appforge_providers::ResponsesApiGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// A final document shorter than this (in characters) is replaced by the fallback.
pub const MIN_FINAL_DOCUMENT_CHARS: usize = 20;

/// How attachment storage is scoped across requests.
#[derive(Clone)]
pub enum AttachmentScope {
    /// Every request writes to the same store.
    Shared(Arc<dyn AttachmentStore>),
    /// Every request gets a fresh `FsAttachmentStore::per_request(root)`.
    PerRequest(PathBuf),
}

impl AttachmentScope {
    fn store_for_request(&self) -> Arc<dyn AttachmentStore> {
        match self {
            Self::Shared(store) => store.clone(),
            Self::PerRequest(root) => Arc::new(FsAttachmentStore::per_request(root)),
        }
    }
}

/// The generation pipeline.
pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    attachments: AttachmentScope,
    policy: RetryPolicy,
}

impl Pipeline {
    /// Create a pipeline with the default retry policy and a shared store.
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn AttachmentStore>) -> Self {
        Self {
            generator,
            attachments: AttachmentScope::Shared(store),
            policy: RetryPolicy::default(),
        }
    }

    /// Build the production pipeline. Fails only on configuration errors.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = ResponsesApiGenerator::from_config(config)?;

        let attachments = if config.isolate_requests {
            AttachmentScope::PerRequest(config.attachments_dir.clone())
        } else {
            AttachmentScope::Shared(Arc::new(FsAttachmentStore::new(&config.attachments_dir)))
        };

        Ok(Self {
            generator: Arc::new(generator),
            attachments,
            policy: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_attachment_scope(mut self, scope: AttachmentScope) -> Self {
        self.attachments = scope;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run one call-and-validate cycle.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let materializer = AttachmentMaterializer::new(self.attachments.store_for_request());
        let attachments = materializer.materialize(&request.attachments);
        let previews = materializer.summarize_previews(&attachments);

        let prompt = prompt::assemble(request, &previews);
        let controller = RetryController::new(self.generator.clone(), self.policy.clone());

        let files = match controller.obtain_valid_response(&prompt).await {
            Some(raw) => finalize(request, &previews, &raw),
            None => {
                warn!("Using fallback app and README: no valid response from generator");
                let fallback = synthesize_fallback(request, &previews);
                GeneratedFiles {
                    index_html: fallback.code_section,
                    readme: fallback.document_section,
                }
            }
        };

        info!(
            round = request.round,
            attachments = attachments.len(),
            "Generation complete"
        );

        GenerationResult { files, attachments }
    }
}

/// Turn an accepted response into files, re-checking both sections.
fn finalize(request: &GenerationRequest, previews: &str, raw: &str) -> GeneratedFiles {
    let Some(parsed) = split_stripped(raw) else {
        warn!("Accepted response lost its README marker; using fallback README");
        return GeneratedFiles {
            index_html: non_empty_code(strip_fences(raw), request),
            readme: fallback_document(request, previews),
        };
    };

    let readme = if parsed.document_section.trim().chars().count() < MIN_FINAL_DOCUMENT_CHARS {
        warn!("README section too short after stripping; using fallback README");
        fallback_document(request, previews)
    } else {
        parsed.document_section
    };

    GeneratedFiles {
        index_html: non_empty_code(parsed.code_section, request),
        readme,
    }
}

fn non_empty_code(code: String, request: &GenerationRequest) -> String {
    if code.trim().is_empty() {
        warn!("Code section empty; using fallback app");
        fallback_code(request)
    } else {
        code
    }
}

/// Single-call entry point: build a request and run it through a fresh pipeline.
pub async fn generate_app_code(
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn AttachmentStore>,
    brief: &str,
    attachments: &[Attachment],
    checks: &[String],
    round_num: u32,
    prev_readme: Option<&str>,
) -> GenerationResult {
    let request = GenerationRequest {
        brief: brief.to_string(),
        attachments: attachments.to_vec(),
        checks: checks.to_vec(),
        round: round_num,
        prior_document: prev_readme.map(str::to_string),
    };
    Pipeline::new(generator, store).generate(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::FALLBACK_NOTE;
    use appforge_core::error::GeneratorError;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl TextGenerator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, GeneratorError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn finalize_keeps_good_sections() {
        let req = GenerationRequest::new("x");
        let files = finalize(
            &req,
            "",
            "```\n<p>app</p>\n```\n---README.md---\n# App\n\nOverview of the app and usage.",
        );
        assert_eq!(files.index_html, "<p>app</p>");
        assert_eq!(files.readme, "# App\n\nOverview of the app and usage.");
    }

    #[test]
    fn finalize_replaces_short_readme() {
        let req = GenerationRequest::new("x");
        let files = finalize(&req, "", "<p>app</p>\n---README.md---\n# Tiny");
        assert_eq!(files.index_html, "<p>app</p>");
        assert!(files.readme.contains(FALLBACK_NOTE));
    }

    #[test]
    fn finalize_without_marker_falls_back_for_readme_only() {
        let req = GenerationRequest::new("x");
        let files = finalize(&req, "", "```\n<p>app</p>\n```");
        assert_eq!(files.index_html, "<p>app</p>");
        assert!(files.readme.contains(FALLBACK_NOTE));
    }

    #[test]
    fn finalize_never_returns_empty_code() {
        let req = GenerationRequest::new("timer app");
        let files = finalize(
            &req,
            "",
            "---README.md---\n# Timer\n\nOverview: a countdown timer app for the browser.",
        );
        assert!(files.index_html.contains("timer app"));
        assert!(files.readme.starts_with("# Timer"));
    }

    #[test]
    fn from_config_requires_credential() {
        let result = Pipeline::from_config(&PipelineConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn from_config_uses_configured_policy() {
        let config = PipelineConfig {
            api_key: Some("tok".into()),
            max_attempts: 3,
            retry_delay_ms: 0,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.retry_policy().max_attempts, 3);
        assert!(pipeline.retry_policy().retry_delay.is_zero());
    }

    #[tokio::test]
    async fn per_request_scope_isolates_attachment_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(Fixed("")),
            Arc::new(crate::storage::MemoryAttachmentStore::new()),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        })
        .with_attachment_scope(AttachmentScope::PerRequest(dir.path().to_path_buf()));

        let req = GenerationRequest::new("x").with_attachments(vec![Attachment::new(
            "a.txt",
            "data:text/plain;base64,aGVsbG8=",
        )]);
        let first = pipeline.generate(&req).await;
        let second = pipeline.generate(&req).await;

        let p1 = &first.attachments[0].path;
        let p2 = &second.attachments[0].path;
        assert_ne!(p1, p2);
        assert!(p1.starts_with(dir.path()));
        assert_eq!(std::fs::read(p1).unwrap(), b"hello");
        assert_eq!(std::fs::read(p2).unwrap(), b"hello");
    }
}
