//! # adlibrary-fetch
//!
//! Fetches every ad library record for one advertiser from a paginated,
//! rate-limited HTTP API and saves them as a single JSON array.
//!
//! ## Behavior
//!
//! - Pages are requested strictly one after another, starting at offset 0
//! - A page with records advances the offset by the page size, then pauses
//! - An empty page ends the session normally
//! - HTTP 429 backs off exponentially and retries the same page, up to a ceiling
//! - Any other failure ends the session immediately
//! - The artifact is always written, holding whatever was accumulated
//!
//! ## Quick Start
//!
//! ```no_run
//! use adlibrary_fetch::{AccessToken, Config, run_session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.fetch.advertiser = "airbnb".to_string();
//!
//!     let token = AccessToken::from_env()?;
//!     let outcome = run_session(&config, token).await?;
//!
//!     if !outcome.is_complete() {
//!         eprintln!("fetch stopped early: {}", outcome.reason);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Output artifact serialization
pub mod artifact;
/// Ad library HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Tolerant views over saved records
pub mod records;
/// Backoff schedule and sleeping
pub mod retry;
/// Paginated fetch controller
pub mod session;
/// Core types
pub mod types;

#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use client::{AdLibraryClient, PageSource};
pub use config::Config;
pub use error::{Error, Result};
pub use retry::{BackoffPolicy, Sleeper, TokioSleeper};
pub use session::{FetchSession, run_session};
pub use types::{AccessToken, PageOutcome, PageRequest, SessionOutcome, TerminationReason};
