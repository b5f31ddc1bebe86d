//! Lenient JSON extraction from model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::OracleError;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Extract the first JSON value from free-form model text.
///
/// Preference order: the contents of a fenced code block if one exists,
/// else the text from the first `[` or `{` onward. Any trailing text after
/// the first complete JSON value is ignored.
pub fn extract_json(text: &str) -> Result<Value, OracleError> {
    let mut stripped = text.trim();

    if let Some(caps) = FENCE_RE.captures(stripped) {
        if let Some(inner) = caps.get(1) {
            stripped = inner.as_str().trim();
        }
    }

    let start = [stripped.find('['), stripped.find('{')]
        .into_iter()
        .flatten()
        .min();
    if let Some(i) = start {
        stripped = &stripped[i..];
    }

    let mut values = serde_json::Deserializer::from_str(stripped).into_iter::<Value>();
    match values.next() {
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(OracleError::MalformedResponse(e.to_string())),
        None => Err(OracleError::MalformedResponse(
            "response contained no JSON value".to_string(),
        )),
    }
}
