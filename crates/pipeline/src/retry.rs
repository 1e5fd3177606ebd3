//! Retry controller — bounded attempts with a quality gate.
//!
//! Each attempt calls the generator once under a hard timeout and classifies
//! the result. The first accepted response ends the loop; anything else
//! consumes an attempt. Running out of attempts is an ordinary outcome,
//! reported as `None`, and never an error.

use crate::response::{is_document_acceptable, split_stripped};
use appforge_config::PipelineConfig;
use appforge_core::error::GeneratorError;
use appforge_core::generator::TextGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How many attempts to make and how long each may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    /// Pause before the next attempt; skipped after the last one.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(120),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            attempt_timeout: config.attempt_timeout(),
            retry_delay: config.retry_delay(),
        }
    }
}

/// What a single attempt came to.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Accepted,
    /// The response had no `---README.md---` marker (includes empty text).
    MissingMarker,
    /// The document section failed the quality gate.
    RejectedDocument { len: usize },
    TransportFailed(GeneratorError),
    TimedOut,
}

impl AttemptOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Classify response text without calling anything.
pub fn evaluate_response(text: &str) -> AttemptOutcome {
    match split_stripped(text) {
        None => AttemptOutcome::MissingMarker,
        Some(parsed) if is_document_acceptable(&parsed.document_section) => {
            AttemptOutcome::Accepted
        }
        Some(parsed) => AttemptOutcome::RejectedDocument {
            len: parsed.document_section.chars().count(),
        },
    }
}

/// The accepted response, if any, and every attempt's outcome in order.
#[derive(Debug, Clone)]
pub struct RetryReport {
    pub response: Option<String>,
    pub outcomes: Vec<AttemptOutcome>,
}

impl RetryReport {
    pub fn attempts(&self) -> usize {
        self.outcomes.len()
    }
}

pub struct RetryController {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run attempts until one is accepted or the budget is spent.
    pub async fn run(&self, prompt: &str) -> RetryReport {
        let max_attempts = self.policy.max_attempts;
        let mut outcomes = Vec::with_capacity(max_attempts as usize);

        for attempt in 1..=max_attempts {
            info!(
                generator = %self.generator.name(),
                attempt,
                max_attempts,
                "Requesting generation"
            );

            let (outcome, text) = self.attempt(prompt).await;
            if outcome.is_accepted() {
                info!(attempt, "Generation accepted");
                outcomes.push(outcome);
                return RetryReport {
                    response: text,
                    outcomes,
                };
            }

            match &outcome {
                AttemptOutcome::Accepted => {}
                AttemptOutcome::MissingMarker => {
                    warn!(attempt, "No README marker found in response");
                }
                AttemptOutcome::RejectedDocument { len } => {
                    warn!(attempt, len, "README section looks insufficient");
                }
                AttemptOutcome::TransportFailed(e) => {
                    warn!(attempt, error = %e, "Generator call failed");
                }
                AttemptOutcome::TimedOut => {
                    warn!(
                        attempt,
                        timeout_secs = self.policy.attempt_timeout.as_secs(),
                        "Generator call timed out"
                    );
                }
            }
            outcomes.push(outcome);

            if attempt < max_attempts && !self.policy.retry_delay.is_zero() {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        warn!(max_attempts, "No valid response after all attempts");
        RetryReport {
            response: None,
            outcomes,
        }
    }

    /// The accepted raw response text, or `None` once attempts are exhausted.
    pub async fn obtain_valid_response(&self, prompt: &str) -> Option<String> {
        self.run(prompt).await.response
    }

    async fn attempt(&self, prompt: &str) -> (AttemptOutcome, Option<String>) {
        match tokio::time::timeout(self.policy.attempt_timeout, self.generator.complete(prompt))
            .await
        {
            Ok(Ok(text)) => {
                let outcome = evaluate_response(&text);
                (outcome, Some(text))
            }
            Ok(Err(e)) => (AttemptOutcome::TransportFailed(e), None),
            Err(_) => (AttemptOutcome::TimedOut, None),
        }
    }
}
