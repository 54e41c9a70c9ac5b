//! Transport-level errors raised by the REST facade

use thiserror::Error;

/// Errors surfaced by [`crate::infrastructure::traits::TaskOperations`].
/// They are reported as-is; nothing at this layer retries them.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("unauthorized: please check the client id and client secret")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for REST facade calls.
pub type TransportResult<T> = Result<T, TransportError>;
