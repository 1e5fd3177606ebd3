//! Deterministic fallback artifacts.
//!
//! Used when the generator never produced an acceptable response. Output
//! depends only on the request and the attachment previews.

use crate::prompt::render_checks;
use appforge_core::request::GenerationRequest;
use appforge_core::result::ParsedResponse;

/// Closing note that marks a README as fallback-generated.
pub const FALLBACK_NOTE: &str =
    "This README was generated as a fallback (the generation service did not return an explicit README).";

/// A minimal static page naming the brief.
pub fn fallback_code(request: &GenerationRequest) -> String {
    format!(
        "<!DOCTYPE html>
<html>
  <head><title>Fallback App</title></head>
  <body>
    <h1>Hello (fallback)</h1>
    <p>This app was generated as a fallback because the generation service failed. Brief: {}</p>
  </body>
</html>",
        request.brief
    )
}

/// A templated README carrying the round, brief, attachments and checks.
pub fn fallback_document(request: &GenerationRequest, attachment_previews: &str) -> String {
    format!(
        "# Auto-generated README (Round {round})

**Project brief:** {brief}

**Attachments:**
{attachments}

**Checks to meet:**
{checks}

## Setup
1. Open `index.html` in a browser.
2. No build steps required.

## Notes
{FALLBACK_NOTE}
",
        round = request.round,
        brief = request.brief,
        attachments = attachment_previews,
        checks = render_checks(&request.checks),
    )
}

/// Both fallback sections.
pub fn synthesize_fallback(request: &GenerationRequest, attachment_previews: &str) -> ParsedResponse {
    ParsedResponse {
        code_section: fallback_code(request),
        document_section: fallback_document(request, attachment_previews),
    }
}
