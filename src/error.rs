//! Error types for adlibrary-fetch
//!
//! Errors here cover setup (configuration, credentials, client construction)
//! and artifact I/O. Failures inside the fetch loop are never raised; they end
//! the session with a [`TerminationReason`](crate::types::TerminationReason).

use thiserror::Error;

/// Result type alias for adlibrary-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for adlibrary-fetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.page_size")
        key: Option<String>,
    },

    /// A required credential was not supplied
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upstream API or an artifact returned a structurally invalid payload
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Build a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
