use serde::de::DeserializeOwned;
use tracing::warn;

use crate::llm_client::LlmError;

/// Deserializes model output as JSON after stripping an optional code fence.
/// The model is only asked for JSON in the prompt, so failures here are expected
/// in practice and carry the raw text for diagnostics.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| {
        warn!(
            "Failed to parse AI response as JSON ({e}): {:?}",
            text.chars().take(200).collect::<String>()
        );
        LlmError::Parse {
            message: e.to_string(),
            raw: text.to_string(),
        }
    })
}

/// Strips a wrapping ```lang ... ``` or ``` ... ``` fence. Unfenced text is
/// returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (e.g. `json`) when it sits alone on the opening line.
    let rest = match rest.find('\n') {
        Some(idx) if is_info_string(&rest[..idx]) => &rest[idx + 1..],
        _ => rest,
    };

    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
