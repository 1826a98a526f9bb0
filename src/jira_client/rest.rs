use std::collections::BTreeMap;

use serde::Deserialize;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Jira's standard error container, returned with most non-2xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// Flatten a Jira error body into one diagnostic line, if it decodes at all.
pub(super) fn api_message(body: &[u8]) -> Option<String> {
    let decoded: ErrorBody = serde_json::from_slice(body).ok()?;
    let mut parts = decoded.error_messages;
    parts.extend(
        decoded
            .errors
            .into_iter()
            .map(|(field, message)| format!("{field}: {message}")),
    );
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("; "))
}

pub(super) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
