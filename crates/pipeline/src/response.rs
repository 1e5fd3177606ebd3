//! Response splitting, fence stripping, and the document quality gate.

use appforge_core::result::ParsedResponse;

/// Separator between the application and document sections.
pub const README_MARKER: &str = "---README.md---";

/// Document sections must be longer than this (in characters) to pass the gate.
pub const MIN_DOCUMENT_CHARS: usize = 50;

const FENCE: &str = "```";

/// Split raw text on the first marker. `None` when the marker is absent.
///
/// Sections are returned as-is; pass them through [`strip_fences`] (or
/// [`strip_sections`]) before use.
pub fn split(raw: &str) -> Option<ParsedResponse> {
    let (code, document) = raw.split_once(README_MARKER)?;
    Some(ParsedResponse {
        code_section: code.to_string(),
        document_section: document.to_string(),
    })
}

/// Split and fence-strip both sections.
pub fn split_stripped(raw: &str) -> Option<ParsedResponse> {
    split(raw).map(strip_sections)
}

pub fn strip_sections(parsed: ParsedResponse) -> ParsedResponse {
    ParsedResponse {
        code_section: strip_fences(&parsed.code_section),
        document_section: strip_fences(&parsed.document_section),
    }
}

/// Unwrap a Markdown code fence.
///
/// Without a fence the text is only trimmed. With one, exactly the content
/// between the first and second fence is taken (to the end if there is no
/// second fence) and trimmed. An info string on the opening line stays part
/// of the content.
pub fn strip_fences(text: &str) -> String {
    let mut parts = text.split(FENCE);
    let _before = parts.next();
    match parts.next() {
        Some(inner) => inner.trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Whether a (fence-stripped) document section is substantive.
///
/// Longer than [`MIN_DOCUMENT_CHARS`] after trimming, and either its first
/// line carries a `"# "` heading marker or the text mentions `Overview`.
pub fn is_document_acceptable(document: &str) -> bool {
    let trimmed = document.trim();
    if trimmed.chars().count() <= MIN_DOCUMENT_CHARS {
        return false;
    }
    let first_line = trimmed.lines().next().unwrap_or_default();
    first_line.contains("# ") || trimmed.contains("Overview")
}
