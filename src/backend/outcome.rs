//! Backend operation outcomes and HTTP error normalization.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::transport::{HttpResponse, TransportError};
use crate::types::{Error, ErrorKind};

/// Longest raw body excerpt carried in a failure message.
const MAX_BODY_EXCERPT: usize = 512;

/// Normalized failure of one backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendFailure {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub message: String,
}

impl BackendFailure {
    pub fn new(kind: ErrorKind, http_status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, None, message)
    }

    /// Failure for a non-2xx response, message taken from the error body.
    pub fn from_status(kind: ErrorKind, response: &HttpResponse) -> Self {
        let detail = extract_error_message(&response.body);
        let message = if detail.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            format!("HTTP {}: {}", response.status, detail)
        };
        Self::new(kind, Some(response.status), message)
    }
}

impl From<TransportError> for BackendFailure {
    fn from(err: TransportError) -> Self {
        Self::new(ErrorKind::Transport, None, err.to_string())
    }
}

impl From<Error> for BackendFailure {
    fn from(err: Error) -> Self {
        Self::new(err.kind(), None, err.message())
    }
}

/// Result of one backend operation: a typed payload or a normalized failure.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome<T> {
    Success(T),
    Failure(BackendFailure),
}

impl<T> BackendOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, BackendOutcome::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BackendOutcome<U> {
        match self {
            BackendOutcome::Success(v) => BackendOutcome::Success(f(v)),
            BackendOutcome::Failure(e) => BackendOutcome::Failure(e),
        }
    }

    pub fn into_result(self) -> Result<T, BackendFailure> {
        self.into()
    }
}

impl<T> From<Result<T, BackendFailure>> for BackendOutcome<T> {
    fn from(result: Result<T, BackendFailure>) -> Self {
        match result {
            Ok(v) => BackendOutcome::Success(v),
            Err(e) => BackendOutcome::Failure(e),
        }
    }
}

impl<T> From<BackendOutcome<T>> for Result<T, BackendFailure> {
    fn from(outcome: BackendOutcome<T>) -> Self {
        match outcome {
            BackendOutcome::Success(v) => Ok(v),
            BackendOutcome::Failure(e) => Err(e),
        }
    }
}

/// Map a response onto a typed payload.
///
/// Non-2xx statuses are classified by [`ErrorKind::from_http_status`]. A 2xx
/// body that does not fit `T` is `UnexpectedStatus`; an empty 2xx body is read
/// as JSON `null` so unit-like payloads (`Option`, `()`) accept 204s.
pub fn parse_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, BackendFailure> {
    if let Some(kind) = ErrorKind::from_http_status(response.status) {
        return Err(BackendFailure::from_status(kind, response));
    }

    let body = response.body.trim();
    let parsed = if body.is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_str(body)
    };
    parsed.map_err(|e| {
        BackendFailure::new(
            ErrorKind::UnexpectedStatus,
            Some(response.status),
            format!(
                "HTTP {} with unexpected body shape: {e}",
                response.status
            ),
        )
    })
}

/// Human-readable message from a backend error body.
///
/// Understands the REST API shape (`errorMessages` list, `errors` map), the
/// admin API shape (`errors[].title` / `detail`) and a bare `message` field.
/// Anything else falls back to a truncated excerpt of the raw body.
pub fn extract_error_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let mut parts: Vec<String> = Vec::new();

        if let Some(messages) = value.get("errorMessages").and_then(Value::as_array) {
            parts.extend(messages.iter().filter_map(Value::as_str).map(str::to_string));
        }
        match value.get("errors") {
            Some(Value::Object(map)) => {
                for (field, msg) in map {
                    let text = msg.as_str().map_or_else(|| msg.to_string(), str::to_string);
                    parts.push(format!("{field}: {text}"));
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let title = item.get("title").and_then(Value::as_str);
                    let detail = item.get("detail").and_then(Value::as_str);
                    match (title, detail) {
                        (Some(t), Some(d)) => parts.push(format!("{t}: {d}")),
                        (Some(s), None) | (None, Some(s)) => parts.push(s.to_string()),
                        (None, None) => {}
                    }
                }
            }
            _ => {}
        }
        if parts.is_empty() {
            if let Some(msg) = value.get("message").and_then(Value::as_str) {
                parts.push(msg.to_string());
            }
        }

        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    truncate(body, MAX_BODY_EXCERPT)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
