//! Errors returned by the certificate API client

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Bad credentials, or a token the API no longer accepts
    #[error("authentication failed")]
    Authentication,

    /// The API rejected the submitted data
    #[error("{0}")]
    Validation(String),

    /// Transport failure, timeout, 5xx or an unreadable response
    #[error("certificate service unavailable: {0}")]
    Unavailable(String),

    #[error("not found")]
    NotFound,
}

impl UpstreamError {
    /// Classify a non-2xx response
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Authentication,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(error_message(body).unwrap_or_else(|| status.to_string()))
            }
            _ => Self::Unavailable(format!("upstream returned {}", status)),
        }
    }

    /// Text safe to show in a page. Only validation messages are passed through.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication => "your session has expired, please log in again".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Unavailable(_) => "the certificate service is unavailable".to_string(),
            Self::NotFound => "the certificate was not found".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Validation(_) => "validation",
            Self::Unavailable(_) => "unavailable",
            Self::NotFound => "not_found",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Unavailable("request timed out".to_string())
        } else if e.is_connect() {
            Self::Unavailable("connection failed".to_string())
        } else if e.is_decode() {
            Self::Unavailable(format!("unreadable response: {}", e))
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

/// Pull a human readable message out of an error body.
/// Accepts `{"message": ..}`, `{"error": ..}` or plain text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        return ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }

    Some(body.to_string())
}
