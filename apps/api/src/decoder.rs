//! Tolerant JSON decoding for model completions that are supposed to be a
//! bare JSON object but may arrive wrapped in prose or code fences.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("completion was empty")]
    Empty,

    #[error("no brace-delimited object found")]
    NoObject,

    #[error("brace-delimited span is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Decodes `text` as JSON.
///
/// A strict parse of the trimmed text is tried first. If that fails, the span
/// from the first `{` to the last `}` (inclusive) is parsed instead. Prose
/// containing unbalanced braces around the object can defeat the fallback.
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let span = brace_span(trimmed).ok_or(DecodeError::NoObject)?;
    serde_json::from_str(span).map_err(DecodeError::Malformed)
}

/// First `{` through last `}`, if the first precedes the last.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
