//! Client error types.

use thiserror::Error;

use crate::api::Envelope;
use crate::config::ConfigError;

/// Every way a hub call can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Local config could not be loaded.
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),

    /// Base URL and path did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request was not sent or no response arrived.
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body could not be read to completion.
    #[error("failed to read response body: {0}")]
    Io(#[source] reqwest::Error),

    /// The response body is not a response envelope, or the payload does
    /// not have the expected shape.
    #[error("failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The hub reported failure.
    #[error("{code}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable code from the hub, or `HTTP_<status>`.
        code: String,
        /// Human-readable message.
        message: String,
        /// The decoded envelope. Its payload is best-effort only.
        envelope: Box<Envelope>,
    },
}

impl Error {
    /// Hub error code, if the hub answered.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Envelope decoded from a failed call.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Error::Api { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// True for unauthorized / forbidden responses.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
