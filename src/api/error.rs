//! Client-side error taxonomy.
//!
//! Every failure a caller can observe is one of these kinds. Read paths
//! convert `Network`/`Server`/`Malformed` into fallback data before they
//! reach the caller; write paths report them as a rolled-back outcome.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete (timeout, DNS, connection refused).
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The action needs a session and none exists. No request was sent.
    #[error("authentication required")]
    AuthRequired,

    /// The server rejected the bearer token (HTTP 401 on an
    /// authenticated call). The stored session has been cleared.
    #[error("session token rejected")]
    AuthRejected,

    /// HTTP 4xx carrying a user-facing message from the backend.
    #[error("{detail}")]
    Validation { detail: String },

    /// HTTP 5xx.
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// A 2xx response whose body could not be decoded.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The session could not be persisted after a successful
    /// authentication; the store was left cleared, not half-written.
    #[error("session storage failed: {0}")]
    Storage(String),
}

/// Error envelope used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ApiError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_passed_through_verbatim() {
        let err = ApiError::Validation {
            detail: "Email ou mot de passe incorrect".to_string(),
        };
        assert_eq!(err.user_message(), "Email ou mot de passe incorrect");
    }

    #[test]
    fn detail_envelope_parses() {
        let parsed: ErrorDetail =
            serde_json::from_str(r#"{"detail": "Vidéo non trouvée"}"#).unwrap();
        assert_eq!(parsed.detail, "Vidéo non trouvée");
    }
}
