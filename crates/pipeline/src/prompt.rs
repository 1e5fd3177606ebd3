//! Prompt assembly.
//!
//! Builds the single instruction payload sent to the generator. Pure text
//! construction: identical requests always produce identical prompts.

use crate::response::README_MARKER;
use appforge_core::request::GenerationRequest;

/// Directive prepended to the prior README in a revision round.
pub const REVISION_DIRECTIVE: &str =
    "Revise and enhance this project according to the new brief below.";

const EMPTY_SECTION: &str = "(none)";

/// Render evaluation checks as a Markdown bullet list.
pub fn render_checks(checks: &[String]) -> String {
    checks
        .iter()
        .map(|check| format!("- {check}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_none(section: &str) -> &str {
    if section.trim().is_empty() {
        EMPTY_SECTION
    } else {
        section
    }
}

/// The fixed output contract every response must follow.
pub fn output_format_rules() -> String {
    format!(
        "### Output format rules:
1. Produce a complete web app (HTML/JS/CSS inline if needed) satisfying the brief.
2. Output must contain **two parts only**:
   - index.html (main code)
   - README.md (starts after a line containing exactly: {README_MARKER})
3. README.md must include:
   - Overview
   - Setup
   - Usage
   - If Round 2, describe improvements made from previous version.
4. Do not include any commentary outside code or README.
"
    )
}

/// Assemble the prompt for one request.
pub fn assemble(request: &GenerationRequest, attachment_previews: &str) -> String {
    let mut prompt = String::from("You are a professional web developer assistant.\n\n");

    prompt.push_str(&format!("### Round\n{}\n\n", request.round));

    if let Some(prior) = request.revision_context() {
        prompt.push_str(&format!(
            "### Previous README.md:\n{prior}\n\n{REVISION_DIRECTIVE}\n\n"
        ));
    }

    prompt.push_str(&format!("### Task\n{}\n\n", request.brief));
    prompt.push_str(&format!(
        "### Attachments (if any)\n{}\n\n",
        or_none(attachment_previews)
    ));
    prompt.push_str(&format!(
        "### Evaluation checks\n{}\n\n",
        or_none(&render_checks(&request.checks))
    ));
    prompt.push_str(&output_format_rules());

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_one_prompt_has_all_sections() {
        let req = GenerationRequest::new("build a todo app")
            .with_checks(["has a title", "persists to localStorage"]);
        let prompt = assemble(&req, "- a.txt (text/plain): preview: hello");

        assert!(prompt.contains("### Round\n1\n"));
        assert!(prompt.contains("### Task\nbuild a todo app\n"));
        assert!(prompt.contains("- a.txt (text/plain): preview: hello"));
        assert!(prompt.contains("- has a title\n- persists to localStorage"));
        assert!(prompt.contains("line containing exactly: ---README.md---"));
        assert!(!prompt.contains(REVISION_DIRECTIVE));
        assert!(!prompt.contains("Previous README.md"));
    }

    #[test]
    fn revision_prompt_embeds_prior_document() {
        let req = GenerationRequest::new("add dark mode").revision("# Old\n\nOld overview.");
        let prompt = assemble(&req, "");

        assert!(prompt.contains("### Round\n2\n"));
        assert!(prompt.contains("### Previous README.md:\n# Old\n\nOld overview.\n"));
        assert!(prompt.contains("Revise and enhance"));
        let directive_at = prompt.find(REVISION_DIRECTIVE).unwrap();
        let task_at = prompt.find("### Task").unwrap();
        assert!(directive_at < task_at);
    }

    #[test]
    fn round_two_without_prior_document_has_no_directive() {
        let req = GenerationRequest::new("add dark mode").with_round(2);
        let prompt = assemble(&req, "");
        assert!(prompt.contains("### Round\n2\n"));
        assert!(!prompt.contains(REVISION_DIRECTIVE));
    }

    #[test]
    fn empty_sections_render_as_none() {
        let prompt = assemble(&GenerationRequest::new("x"), "");
        assert!(prompt.contains("### Attachments (if any)\n(none)\n"));
        assert!(prompt.contains("### Evaluation checks\n(none)\n"));
    }

    #[test]
    fn format_rules_are_invariant() {
        let a = assemble(&GenerationRequest::new("a"), "");
        let b = assemble(&GenerationRequest::new("b").revision("# Old"), "- f (x): 1 bytes");
        let rules = output_format_rules();
        assert!(a.ends_with(&rules));
        assert!(b.ends_with(&rules));
        for section in ["Overview", "Setup", "Usage", "If Round 2"] {
            assert!(rules.contains(section));
        }
    }

    #[test]
    fn assembly_is_deterministic() {
        let req = GenerationRequest::new("calculator").with_checks(["adds numbers"]);
        assert_eq!(assemble(&req, "p"), assemble(&req, "p"));
    }

    #[test]
    fn render_checks_as_bullets() {
        assert_eq!(render_checks(&[]), "");
        assert_eq!(
            render_checks(&["a".to_string(), "b".to_string()]),
            "- a\n- b"
        );
    }
}
