//! Core types for adlibrary-fetch

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Bearer token for the ad library API
///
/// Opaque; the session never refreshes it. `Debug` output is redacted so the
/// token does not leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token, rejecting empty values
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::MissingCredential(crate::config::ACCESS_TOKEN_ENV));
        }
        Ok(Self(token))
    }

    /// Read the token from `LI_ACCESS_TOKEN`
    ///
    /// Callers that want `.env` support should run `dotenvy::dotenv()` first.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(crate::config::ACCESS_TOKEN_ENV)
            .map_err(|_| Error::MissingCredential(crate::config::ACCESS_TOKEN_ENV))?;
        Self::new(raw)
    }

    /// The raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// One page request; built fresh for every HTTP call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Advertiser whose records are requested
    pub advertiser: String,
    /// Index of the first record on the page
    pub offset: u64,
    /// Number of records requested
    pub count: u32,
}

/// Classified result of a single page request
#[derive(Clone, Debug, PartialEq)]
pub enum PageOutcome {
    /// HTTP 200 with at least one record
    Records(Vec<Value>),
    /// HTTP 200 with no records; end of the result set
    Empty,
    /// HTTP 429
    Throttled,
    /// Any other status, an unusable body, or a transport error
    Failed {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// What went wrong
        message: String,
    },
}

/// Why a fetch session stopped
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    /// An empty page was returned; every record was fetched
    Completed,
    /// A page stayed throttled until the retry ceiling was reached
    RetriesExhausted {
        /// Offset of the abandoned page
        offset: u64,
        /// Throttled responses received for that page
        attempts: u32,
    },
    /// A non-retryable failure stopped the session
    HardFailure {
        /// Offset of the failed page
        offset: u64,
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// What went wrong
        message: String,
    },
}

impl TerminationReason {
    /// Short machine-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::Completed => "completed",
            TerminationReason::RetriesExhausted { .. } => "exhausted",
            TerminationReason::HardFailure { .. } => "hard_failure",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::Completed => write!(f, "completed"),
            TerminationReason::RetriesExhausted { offset, attempts } => write!(
                f,
                "retries exhausted at offset {offset} after {attempts} throttled responses"
            ),
            TerminationReason::HardFailure {
                offset,
                status: Some(status),
                message,
            } => write!(f, "hard failure at offset {offset} (HTTP {status}): {message}"),
            TerminationReason::HardFailure {
                offset,
                status: None,
                message,
            } => write!(f, "hard failure at offset {offset}: {message}"),
        }
    }
}

/// Everything a finished session produced
///
/// `records` holds whatever was accumulated, regardless of `reason`.
#[must_use]
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    /// Accumulated records in page order
    pub records: Vec<Value>,
    /// Why the session stopped
    pub reason: TerminationReason,
    /// HTTP requests issued, retries included
    pub requests: u32,
    /// Pages with data that were accumulated
    pub pages: u32,
}

impl SessionOutcome {
    /// True only when the whole result set was fetched
    pub fn is_complete(&self) -> bool {
        self.reason == TerminationReason::Completed
    }
}
