//! Gateway Errors
//!
//! Every failed call is classified exactly once, here. Callers react to the
//! classification and never see raw transport errors.

use reqwest::StatusCode;
use serde::Serialize;

/// Classified API failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Credential missing, invalid or expired (HTTP 401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Input rejected by the server; the message is shown verbatim
    #[error("{0}")]
    Validation(String),

    /// Network or backend failure, worth retrying
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Anything that fits nowhere else, including malformed responses
    #[error("unexpected response: {0}")]
    Unknown(String),
}

/// Payload-free mirror of `ApiError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    Validation,
    Unavailable,
    Unknown,
}

/// What a page shows when a call fails
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Analysis service currently unavailable. Please retry in a moment.";
pub const UNKNOWN_MESSAGE: &str = "Something went wrong. Please try again.";

impl ApiError {
    /// Classify a non-success response from its status and body
    pub fn classify(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);

        match status.as_u16() {
            401 => ApiError::Unauthorized(detail.unwrap_or_default()),
            408 | 429 | 500..=599 => ApiError::Unavailable(
                detail.unwrap_or_else(|| status.to_string()),
            ),
            400..=499 => match detail {
                Some(message) => ApiError::Validation(message),
                None => ApiError::Unknown(format!("HTTP {}", status)),
            },
            _ => ApiError::Unknown(format!("HTTP {}", status)),
        }
    }

    /// Classify a transport-level failure
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Unknown(format!("unexpected response shape: {}", err))
        } else if err.is_builder() {
            ApiError::Unknown(err.to_string())
        } else {
            // connect, timeout, body I/O
            ApiError::Unavailable(err.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Unavailable(_) => ErrorKind::Unavailable,
            ApiError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Human-readable message for inline display
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(detail) if !detail.is_empty() => detail.clone(),
            ApiError::Unauthorized(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            ApiError::Unknown(_) => UNKNOWN_MESSAGE.to_string(),
        }
    }

    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind(),
            message: self.user_message(),
        }
    }
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        err.info()
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Pull the server's error detail out of a response body.
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}, ...]}`, and `{"error": "..."}` / `{"message": "..."}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    ["error", "message"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
