//! Text extraction from heterogeneous response bodies.
//!
//! Responses-style endpoints and chat-completions proxies put the generated
//! text in different places. Each shape gets a pure strategy; strategies are
//! tried in priority order and the first one that recognizes its shape wins.

use serde_json::Value;

/// A single extraction strategy. Returns `None` when the shape is absent.
pub type ExtractStrategy = fn(&Value) -> Option<String>;

/// Strategies in priority order, with the field each one keys on.
pub const STRATEGIES: &[(&str, ExtractStrategy)] = &[
    ("output_text", from_output_text),
    ("output", from_output_items),
    ("choices", from_chat_choices),
];

/// Extract generated text from a response body.
///
/// Returns an empty string when no strategy recognizes the body.
pub fn extract_text(body: &Value) -> String {
    STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(body))
        .unwrap_or_default()
}

/// Top-level `output_text`. Only a non-empty string counts.
pub fn from_output_text(body: &Value) -> Option<String> {
    body.get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// `output[].content[]`, where each entry is `{"text": ...}` or a bare string.
pub fn from_output_items(body: &Value) -> Option<String> {
    let items = body.get("output")?.as_array()?;
    let mut text = String::new();
    for item in items {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for entry in content {
            match entry {
                Value::String(s) => text.push_str(s),
                Value::Object(obj) => {
                    if let Some(t) = obj.get("text").and_then(Value::as_str) {
                        text.push_str(t);
                    }
                }
                _ => {}
            }
        }
    }
    Some(text)
}

/// `choices[].message.content`, concatenated in order.
pub fn from_chat_choices(body: &Value) -> Option<String> {
    let choices = body.get("choices")?.as_array()?;
    Some(
        choices
            .iter()
            .filter_map(|choice| choice.pointer("/message/content").and_then(Value::as_str))
            .collect(),
    )
}
