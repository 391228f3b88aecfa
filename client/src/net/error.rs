//! Error types for the identity boundary.
//!
//! ERROR HANDLING
//! ==============
//! `ServiceError` describes what went wrong talking to the hosted service.
//! `AuthError` is the single user-facing shape: a human-readable message that
//! pages show verbatim in a notification.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failure reported by the identity client.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Auth session missing!")]
    SessionMissing,
    #[error("identity service is only available in the browser")]
    Unavailable,
}

impl ServiceError {
    /// Build an `Api` error from a non-success response body.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = error_body_message(body).unwrap_or_else(|| format!("request failed: {status}"));
        Self::Api { status, message }
    }

    /// Whether the service rejected the credentials/token outright.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Pull the human-readable message out of an auth or REST error body.
pub fn error_body_message(body: &Value) -> Option<String> {
    ["msg", "error_description", "message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_owned)
}

/// Uniform error raised by user-initiated auth actions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self { message: FALLBACK_ERROR_MESSAGE.to_owned() }
        } else {
            Self { message }
        }
    }
}

impl From<ServiceError> for AuthError {
    fn from(err: ServiceError) -> Self {
        Self::new(err.to_string())
    }
}
