use shared::protocol::Endpoint;
use thiserror::Error;

/// Banner text when a failure carries no message of its own.
pub const LOAD_FAILED: &str = "Failed to load data";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-2xx response. `message` is the response body, or a generic
    /// fallback when the body was empty.
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("invalid JSON from {url}: {message}")]
    Parse { url: String, message: String },
    #[error("unexpected payload from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            LOAD_FAILED.to_string()
        } else {
            message
        }
    }
}

/// First failure observed while loading a reload batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{endpoint}: {source}")]
pub struct ReloadError {
    pub endpoint: Endpoint,
    #[source]
    pub source: FetchError,
}

impl ReloadError {
    pub fn new(endpoint: Endpoint, source: FetchError) -> Self {
        Self { endpoint, source }
    }

    pub fn user_message(&self) -> String {
        self.source.user_message()
    }
}
