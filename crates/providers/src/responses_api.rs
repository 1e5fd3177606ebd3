//! Responses-API text generator.
//!
//! Works with: OpenAI's `/v1/responses`, OpenRouter, AIPipe and any proxy
//! exposing the same request shape. Response bodies are accepted in any of
//! the shapes understood by [`crate::extract`], so chat-completions style
//! proxies work too.

use appforge_config::{ConfigError, DEFAULT_SYSTEM_PROMPT, PipelineConfig};
use appforge_core::error::GeneratorError;
use appforge_core::generator::TextGenerator;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::extract::extract_text;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const GENERATOR_NAME: &str = "aipipe";

/// Seconds to suggest waiting when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// A text generator backed by a Responses-style HTTP endpoint.
pub struct ResponsesApiGenerator {
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ResponsesApiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsesApiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ResponsesApiGenerator {
    /// Create a generator with the default timeout and system prompt.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GeneratorError> {
        Self::with_timeout(base_url, api_key, model, DEFAULT_TIMEOUT)
    }

    /// Create a generator with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client,
        })
    }

    /// Build from configuration. Fails when no credential is configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        let generator = Self::with_timeout(
            config.api_base.as_str(),
            api_key,
            config.model.as_str(),
            config.attempt_timeout(),
        )
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(generator.with_system_prompt(config.system_prompt.as_str()))
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": prompt },
            ],
        })
    }
}

fn transport_error(e: reqwest::Error) -> GeneratorError {
    if e.is_timeout() {
        GeneratorError::Timeout(e.to_string())
    } else {
        GeneratorError::Network(e.to_string())
    }
}

#[async_trait]
impl TextGenerator for ResponsesApiGenerator {
    fn name(&self) -> &str {
        GENERATOR_NAME
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<String, GeneratorError> {
        let url = self.endpoint();

        debug!(
            generator = GENERATOR_NAME,
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(GeneratorError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(GeneratorError::AuthenticationFailed(
                "Invalid API token or insufficient permissions".into(),
            ));
        }

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Generator returned error");
            return Err(GeneratorError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let raw = response.text().await.map_err(transport_error)?;
        let body: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        let text = extract_text(&body);
        debug!(body_len = raw.len(), text_len = text.len(), "Received generator response");
        if text.is_empty() {
            warn!(generator = GENERATOR_NAME, "Generator returned no text in any known field");
        }
        Ok(text)
    }
}
