//! The generation request — everything one pipeline invocation needs.

use crate::attachment::Attachment;
use serde::{Deserialize, Serialize};

/// Round number of an initial generation.
pub const INITIAL_ROUND: u32 = 1;

/// Round number of a revision informed by a prior document.
pub const REVISION_ROUND: u32 = 2;

/// Input to a single call-and-validate cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description of the app to build
    pub brief: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// Evaluation checks the generated app must satisfy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,

    #[serde(default = "default_round")]
    pub round: u32,

    /// README from the previous round. Only consulted when `round == 2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_document: Option<String>,
}

fn default_round() -> u32 {
    INITIAL_ROUND
}

impl GenerationRequest {
    /// Create a round-1 request for the given brief.
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            attachments: Vec::new(),
            checks: Vec::new(),
            round: INITIAL_ROUND,
            prior_document: None,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_checks<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks = checks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    /// Turn this into a round-2 revision of a previously generated README.
    pub fn revision(mut self, prior_document: impl Into<String>) -> Self {
        self.round = REVISION_ROUND;
        self.prior_document = Some(prior_document.into());
        self
    }

    /// The prior document, if it should shape this round's prompt.
    ///
    /// Returns `None` outside round 2 and for an empty prior document.
    pub fn revision_context(&self) -> Option<&str> {
        if self.round != REVISION_ROUND {
            return None;
        }
        self.prior_document.as_deref().filter(|doc| !doc.is_empty())
    }
}
