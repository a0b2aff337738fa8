//! Recover a JSON object from free-form model output.
//!
//! Models wrap their answer in prose or code fences. The scanner walks each
//! `{` in order, follows brace depth (ignoring braces inside string literals)
//! to the matching `}` and returns the first slice that parses as an object.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ApiError;

/// Index of the `}` closing the object that opens at `start`.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced `{...}` in `text` that parses as a JSON object.
pub fn extract_json(text: &str) -> Result<Value, ApiError> {
    let bytes = text.as_bytes();
    for (start, _) in text.match_indices('{') {
        let Some(end) = balanced_end(bytes, start) else {
            trace!(start, "unbalanced candidate");
            continue;
        };
        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(value @ Value::Object(_)) => {
                trace!(start, end, "extracted JSON object");
                return Ok(value);
            }
            Ok(_) => {}
            Err(err) => trace!(start, end, error = %err, "candidate is not JSON"),
        }
    }
    debug!(len = text.len(), "no JSON object in AI response");
    Err(ApiError::malformed(text))
}

/// [`extract_json`] followed by deserialization into `T`.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(|err| {
        debug!(error = %err, "AI JSON has unexpected shape");
        ApiError::malformed(text)
    })
}
