use std::time::Duration;

use thiserror::Error;

/// All errors that can occur when using the UlazAI SDK.
#[derive(Error, Debug)]
pub enum UlazAiError {
    /// The API key is missing, blank, or cannot be sent as a header.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The API answered with a non-2xx status.
    ///
    /// `message` comes from the payload's `error` or `message` field, falling
    /// back to the HTTP reason phrase. `payload` is empty when the body was
    /// not a JSON object.
    #[error("HTTP {status_code}: {message}")]
    Api {
        status_code: u16,
        message: String,
        payload: serde_json::Map<String, serde_json::Value>,
    },

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A request body could not be encoded as JSON.
    #[error("invalid request body: {0}")]
    Json(#[from] serde_json::Error),

    /// A `wait_for_*` call saw no terminal status before its deadline.
    #[error("timed out waiting for {id} after {timeout:?}")]
    Timeout { id: String, timeout: Duration },
}

impl UlazAiError {
    /// HTTP status of an [`UlazAiError::Api`] error, `None` for every other kind.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// A convenience alias for `Result<T, UlazAiError>`.
pub type Result<T> = std::result::Result<T, UlazAiError>;
