//! Error types for the Causality API client.
//!
//! # Design
//! A rejected HTTP status carries the server's own `message` when one can be
//! extracted, so `Display` on `Request` is exactly what the server said (or
//! the generic `HTTP error! Status: <code>` fallback). Transport failures
//! keep the underlying error as their source and are never reinterpreted.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `CausalityClient` and `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The network round-trip itself failed (DNS, connect, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// A success body could not be decoded into the expected result type.
    #[error("failed to parse response body: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ApiError::Transport(err.into())
    }

    /// HTTP status of a rejected request, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[cfg(feature = "async")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(Box::new(err))
    }
}
