//! Prompt templates for outline generation
//!
//! Templates use plain `format!()` interpolation so a missing variable is a
//! compile-time error.

/// Generate the prompt that asks a model for a slide outline.
///
/// The model is told to answer with a JSON object holding a `title` and an
/// ordered `slides` array whose entries are tagged `"title"` or `"content"`.
/// Non-blank guidance is appended to the instruction sentence.
///
/// # Example
/// ```
/// use slidesmith::llm::prompts::outline_prompt;
///
/// let prompt = outline_prompt("Rust ownership in five minutes", Some("Keep it playful"));
/// assert!(prompt.contains("Rust ownership"));
/// assert!(prompt.contains("Keep it playful"));
/// ```
pub fn outline_prompt(text: &str, guidance: Option<&str>) -> String {
    let guidance = guidance
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or_default();

    format!(
        r#"Please analyze the following text and create a structured presentation outline. {guidance}
TEXT TO ANALYZE:
{text}

Respond with a JSON object in this format:
{{
  "title": "Presentation Title",
  "slides": [
    {{"type": "title", "title": "Main Title", "subtitle": "Subtitle"}},
    {{"type": "content", "title": "Slide Title", "content": ["Bullet 1", "Bullet 2"]}}
  ]
}}
Respond with valid JSON only."#
    )
}
