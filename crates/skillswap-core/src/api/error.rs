use serde_json::Value;
use thiserror::Error;

use crate::auth::StorageError;

/// Every way a controller operation can fail.
///
/// `Validation` and `Business` are recovered at the call site as a message.
/// `SessionExpired` has already cleared the session by the time the caller
/// sees it. `Transport` means no response arrived.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("{message}")]
    Business { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// Understands `{"detail": "..."}`, the list form of `detail` produced by
    /// request validation (`[{"msg": "..."}]`), and `{"message": "..."}`.
    pub fn message_from_body(status: u16, body: &str) -> String {
        let fallback = || format!("Request failed ({})", status);
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return fallback();
        };
        match value.get("detail") {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
        match value.get("message") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => fallback(),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Business {
            status: status.as_u16(),
            message: Self::message_from_body(status.as_u16(), body),
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Unauthenticated => "Please log in to continue.".to_string(),
            ApiError::SessionExpired(_) => "Your session has expired. Please log in again.".to_string(),
            ApiError::Business { message, .. } => message.clone(),
            ApiError::Transport(_) => "Network error. Please try again.".to_string(),
            ApiError::InvalidResponse(_) => "The server sent an unexpected response.".to_string(),
            ApiError::Storage(_) => "Could not save your session on this device.".to_string(),
        }
    }

    /// Whether the caller should route the user to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::SessionExpired(_))
    }
}
