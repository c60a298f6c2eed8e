use guest_exec::RemoteError;
use reqwest::StatusCode;

use crate::types::ApiErrorBody;

/// Classify a non-success vAPI response.
///
/// The `error_type` of the body decides when present; the HTTP status is the
/// fallback for bodies that are empty or not vAPI errors.
pub(crate) fn classify(context: &str, status: StatusCode, body: &str) -> RemoteError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    let messages: Vec<&str> = parsed
        .messages
        .iter()
        .map(|m| m.default_message.as_str())
        .filter(|m| !m.is_empty())
        .collect();
    let message = if !messages.is_empty() {
        messages.join("; ")
    } else if !body.trim().is_empty() {
        body.trim().to_string()
    } else {
        status.to_string()
    };
    let detail = format!("{context} {status}: {message}");

    match parsed.error_type.as_deref() {
        Some("UNAUTHENTICATED" | "UNAUTHORIZED") => RemoteError::Unauthenticated(detail),
        Some("NOT_FOUND") => RemoteError::NotFound(detail),
        Some(_) => RemoteError::Fault(detail),
        None => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::Unauthenticated(detail)
            }
            StatusCode::NOT_FOUND => RemoteError::NotFound(detail),
            _ => RemoteError::Fault(detail),
        },
    }
}
