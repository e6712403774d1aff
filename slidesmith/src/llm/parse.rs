use crate::error::{Result, SlidesmithError};
use crate::models::Outline;

/// Remove Markdown code-fence markers (```` ```json ```` and ```` ``` ````) from model output.
pub fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse model output into an [`Outline`], stripping code fences first.
pub fn parse_outline(raw: &str) -> Result<Outline> {
    let cleaned = strip_code_fences(raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::error!(
            response_len = cleaned.len(),
            response_preview = %cleaned.chars().take(100).collect::<String>(),
            error = %e,
            "Failed to parse outline JSON"
        );
        SlidesmithError::OutlineParse(e.to_string())
    })
}
