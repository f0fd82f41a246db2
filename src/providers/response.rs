use serde_json::Value;

use super::types::{ProviderError, Result};

/// Pull the generated text out of a provider reply.
///
/// Tried in order, first non-empty trimmed string wins:
/// `choices[0].message.content`, `choices[0].text`, `choices[0]` as a plain
/// string, then top-level `result`, `response`, `content`, `text`.
pub fn extract_topic(body: &Value) -> Result<String> {
    let first_choice = body.pointer("/choices/0");

    let candidates = [
        first_choice.and_then(|c| c.pointer("/message/content")),
        first_choice.and_then(|c| c.get("text")),
        first_choice,
        body.get("result"),
        body.get("response"),
        body.get("content"),
        body.get("text"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            let mut preview = body.to_string();
            if preview.len() > 200 {
                let mut end = 200;
                while !preview.is_char_boundary(end) {
                    end -= 1;
                }
                preview.truncate(end);
            }
            ProviderError::ResponseFormat(format!("no topic text in response: {preview}"))
        })
}
