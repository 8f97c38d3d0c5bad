//! Recovery of structured values from multiply-encoded JSON strings.
//!
//! Upstream automation tools often serialize a payload, embed the result as a
//! string in another payload, and serialize again. `normalize` peels those
//! layers off until it reaches something that is not a string.

use crate::{Error, Result};
use serde_json::Value;

/// Maximum number of decode passes before the input is rejected.
pub const MAX_UNWRAP_DEPTH: usize = 16;

/// Decodes `input` repeatedly while each pass yields another string.
///
/// Returns the input itself as a string value when it is not JSON at all.
/// Text carrying literal `\"` sequences (an escaped payload that lost its
/// surrounding quotes) is unescaped once and decoded again.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the value is still decodable after
/// [`MAX_UNWRAP_DEPTH`] passes.
pub fn normalize(input: &str) -> Result<Value> {
    let Some(mut current) = decode(input) else {
        return Ok(Value::String(input.to_string()));
    };

    let mut depth = 1;
    while let Value::String(text) = &current {
        let Some(next) = decode(text) else {
            break;
        };
        if depth == MAX_UNWRAP_DEPTH {
            return Err(Error::MalformedInput(format!(
                "value is still encoded after {MAX_UNWRAP_DEPTH} decode passes"
            )));
        }
        depth += 1;
        current = next;
    }

    Ok(current)
}

fn decode(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    if text.contains("\\\"") {
        return serde_json::from_str(&unescape_quotes(text)).ok();
    }
    None
}

/// Collapses one level of `\"` and `\\` escaping, leaving other escapes alone.
fn unescape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('"' | '\\')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}
