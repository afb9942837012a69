//! Error types for issue tracker operations

use thiserror::Error;

/// Result type for issue tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the issue tracker
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a status other than the one the operation expects
    #[error("{message} (HTTP {status})")]
    Api { message: String, status: u16 },

    /// The request failed before any status code arrived
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An `updated_at` value that is not `YYYY-MM-DDTHH:MM:SSZ`
    #[error("malformed timestamp {value:?}: {source}")]
    Format {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected before a request was sent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
