// src/error.rs
use thiserror::Error;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    #[error("unexpected response body: {0}")]
    Malformed(String),
}

/// `localStorage` refused a write (quota, private mode, disabled storage).
#[derive(Debug, Error)]
#[error("could not write to localStorage: {reason}")]
pub(crate) struct StorageError {
    pub reason: String,
}

impl ApiError {
    /// Text shown to the user. The server's own detail wins when there is one.
    pub(crate) fn user_message(&self, rejected_fallback: &str, failed_fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Rejected { detail: None, .. } => rejected_fallback.to_string(),
            ApiError::Transport(_) | ApiError::Malformed(_) => failed_fallback.to_string(),
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ApiError::Malformed(e.to_string()),
            other => ApiError::Transport(other.to_string()),
        }
    }
}
