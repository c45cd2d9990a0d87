use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' is not an array")]
    NotArray(&'static str),

    #[error("field '{0}' is empty")]
    EmptyArray(&'static str),

    #[error("field '{0}' is not a string")]
    NotText(&'static str),
}

fn field<'a>(node: &'a Value, name: &'static str) -> Result<&'a Value, ResponseParseError> {
    node.get(name).ok_or(ResponseParseError::MissingField(name))
}

fn first<'a>(node: &'a Value, name: &'static str) -> Result<&'a Value, ResponseParseError> {
    field(node, name)?
        .as_array()
        .ok_or(ResponseParseError::NotArray(name))?
        .first()
        .ok_or(ResponseParseError::EmptyArray(name))
}

/// Pulls `candidates[0].content.parts[0].text` out of a `generateContent` response.
pub fn extract_text(raw: &str) -> Result<String, ResponseParseError> {
    let root: Value = serde_json::from_str(raw)?;

    let candidate = first(&root, "candidates")?;
    let part = first(field(candidate, "content")?, "parts")?;

    field(part, "text")?
        .as_str()
        .map(ToString::to_string)
        .ok_or(ResponseParseError::NotText("text"))
}

/// Like [`extract_text`], but reports failures inside the returned text.
pub fn extract_text_or_message(raw: &str) -> String {
    extract_text(raw).unwrap_or_else(|e| format!("Error processing request:{e}"))
}
