//! Embedded data block handling.
//!
//! A reply may contain:
//!
//! ```text
//! Thanks, noted your role at Acme.
//! <!--RESUME_DATA
//! { "summary": "..." }
//! RESUME_DATA-->
//! ```
//!
//! The sentinels are opaque bracketing tokens, not HTML. Only the first block
//! is read as data; every block is removed from display text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const OPEN_SENTINEL: &str = "<!--RESUME_DATA";
pub const CLOSE_SENTINEL: &str = "RESUME_DATA-->";

/// A raw patch as it came off the wire: a JSON object of unconstrained shape.
/// Shape checks happen at merge time (`ResumePatch::from_extracted`).
pub type ExtractedPatch = Map<String, Value>;

/// Shortest span between the sentinels, capturing the interior.
static BLOCK_CAPTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}\s*(.*?)\s*{}",
        regex::escape(OPEN_SENTINEL),
        regex::escape(CLOSE_SENTINEL)
    ))
    .expect("valid block regex")
});

/// Same span without the capture group, used for removal.
static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(OPEN_SENTINEL),
        regex::escape(CLOSE_SENTINEL)
    ))
    .expect("valid block regex")
});

/// Returns the JSON object carried by the first data block of `raw_reply`.
///
/// `None` when there is no block (the usual case), when the interior is not
/// valid JSON, or when it is valid JSON but not an object. Never panics and
/// never returns an error: malformed generated data must not break the chat.
pub fn extract_patch(raw_reply: &str) -> Option<ExtractedPatch> {
    let Some(captures) = BLOCK_CAPTURE.captures(raw_reply) else {
        debug!("Reply carries no resume data block");
        return None;
    };

    let interior = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");

    match serde_json::from_str::<Value>(interior) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(
                "Resume data block is not a JSON object (found {}), ignoring",
                json_kind(&other)
            );
            None
        }
        Err(e) => {
            warn!("Failed to parse resume data block JSON: {e}");
            None
        }
    }
}

/// Removes every data block from `raw_reply` and trims the result.
///
/// Once a block has been removed, stray sentinels left around it are removed
/// as well, and both passes repeat until the text stops changing. The result
/// never contains a sentinel, so a second call is a no-op. Text with no block
/// comes back as `raw_reply.trim()`, lone sentinels included.
pub fn strip_patch_for_display(raw_reply: &str) -> String {
    if !BLOCK.is_match(raw_reply) {
        return raw_reply.trim().to_string();
    }

    let mut text = raw_reply.to_string();
    loop {
        let next = BLOCK
            .replace_all(&text, "")
            .replace(OPEN_SENTINEL, "")
            .replace(CLOSE_SENTINEL, "");
        if next == text {
            break;
        }
        text = next;
    }
    text.trim().to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
