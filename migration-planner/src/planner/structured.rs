//! JSON extraction and parsing for structured LLM responses

use serde::de::DeserializeOwned;

/// Extract JSON content from markdown code blocks or raw text
///
/// Handles:
/// - Raw JSON text, which may itself contain fences inside string values
/// - ```json blocks
/// - Generic ``` blocks
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    let body = if let Some(start) = text.find("```json") {
        fenced_body(text, start + "```json".len())
    } else if let Some(start) = text.find("```") {
        fenced_body(text, start + "```".len())
    } else {
        text
    };
    body.trim()
}

fn fenced_body(text: &str, body_start: usize) -> &str {
    let rest = &text[body_start..];
    match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Parse a structured response into `T`.
///
/// The whole response is tried as JSON first; fence extraction is only the
/// fallback for answers wrapped in prose or markdown.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let json = extract_json(text);
    serde_json::from_str(json).map_err(|e| {
        tracing::debug!(
            preview = %json.chars().take(500).collect::<String>(),
            "Structured response failed to parse"
        );
        e
    })
}
