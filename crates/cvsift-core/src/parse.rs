//! Cleanup and parsing of the model's text reply.
//!
//! Models frequently wrap their JSON in Markdown code fences or add prose
//! around it. The reply is cleaned in two steps before parsing: strip a
//! leading fence, then keep only the window from the first `{` to the last
//! `}`.

use crate::{CoreError, CvRecord};

/// Parse a model reply into a [`CvRecord`] for `filename`.
pub fn parse_record(reply: &str, filename: &str) -> Result<CvRecord, CoreError> {
    let cleaned = strip_code_fence(reply);
    let json = brace_window(cleaned)
        .ok_or_else(|| CoreError::MalformedReply("no JSON object in reply".into()))?;
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| CoreError::MalformedReply(e.to_string()))?;
    Ok(CvRecord::from_value(filename, &value))
}

/// Remove a leading ``` / ```json fence and its closing fence, if present.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    inner.trim()
}

/// The substring from the first `{` to the last `}`, if any.
fn brace_window(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&s[start..=end])
}
