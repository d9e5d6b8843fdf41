//! Tolerant extraction of a JSON object from free-form model output.
//!
//! Models wrap structured replies in code fences or surround them with prose.
//! `extract_json_object` tries, in order:
//! 1. the whole text after stripping fences and whitespace
//! 2. the substring from the first `{` to the last `}`
//!
//! Anything else is a [`ParseFailure`]. No further repair is attempted.

use serde_json::{Map, Value};

/// Why no JSON object could be recovered from a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("reply is empty")]
    Empty,

    #[error("no JSON object found in reply")]
    NoObject,

    #[error("malformed JSON object: {0}")]
    Malformed(String),
}

/// Recover a JSON object from `raw`.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, ParseFailure> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return Err(ParseFailure::Empty);
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(cleaned) {
        return Ok(map);
    }

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Err(ParseFailure::NoObject);
    };
    if end < start {
        return Err(ParseFailure::NoObject);
    }

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParseFailure::NoObject),
        Err(e) => Err(ParseFailure::Malformed(e.to_string())),
    }
}

/// Trim whitespace and a surrounding triple-backtick fence (with optional
/// language tag).
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag line ("json", "JSON", ...).
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}
