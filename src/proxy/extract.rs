use serde_json::Value;

/// Upper bound on the raw model text echoed back with an extraction error.
pub const RAW_EXCERPT_LIMIT: usize = 4000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("No JSON found in model output")]
    NotFound,

    #[error("Model did not return valid JSON")]
    InvalidJson { raw: String },
}

impl ExtractError {
    /// Bounded prefix of the model text, for diagnostics only.
    pub fn raw(&self) -> Option<&str> {
        match self {
            ExtractError::InvalidJson { raw } => Some(raw),
            ExtractError::NotFound => None,
        }
    }
}

/// Parse the span between the first `{` and the last `}` of `text`.
///
/// Models wrap their JSON in prose or markdown fences often enough that a
/// strict parse of the whole reply is useless. This is a heuristic: prose
/// braces before the object or after it will break it.
pub fn extract_first_json_object(text: &str) -> Result<Value, ExtractError> {
    if text.is_empty() {
        return Err(ExtractError::NotFound);
    }

    let start = text.find('{').ok_or(ExtractError::NotFound)?;
    let end = text.rfind('}').ok_or(ExtractError::NotFound)?;
    if end <= start {
        return Err(ExtractError::NotFound);
    }

    serde_json::from_str(&text[start..=end]).map_err(|_| ExtractError::InvalidJson {
        raw: excerpt(text),
    })
}

/// First [`RAW_EXCERPT_LIMIT`] characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(RAW_EXCERPT_LIMIT) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
