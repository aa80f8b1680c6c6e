//! Paginated fetch controller
//!
//! A session walks the advertiser's result set one page at a time. Every
//! response is reduced to a [`Step`]:
//!
//! ```text
//! FETCHING(offset, retries)
//!   records                      -> FETCHING(offset + page_size, 0)
//!   empty                        -> DONE(completed)
//!   throttled, below ceiling     -> BACKOFF -> FETCHING(offset, retries + 1)
//!   throttled, ceiling reached   -> DONE(retries exhausted)
//!   anything else                -> DONE(hard failure)
//! ```
//!
//! Whatever was accumulated is returned in every terminal state.

use crate::artifact;
use crate::client::{AdLibraryClient, PageSource};
use crate::config::Config;
use crate::error::Result;
use crate::retry::{BackoffPolicy, Sleeper, TokioSleeper};
use crate::types::{AccessToken, PageOutcome, PageRequest, SessionOutcome, TerminationReason};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Decision taken after one page response
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Keep the records and move to the next page
    Advance(Vec<Value>),
    /// Wait, then re-issue the same page
    Backoff,
    /// End the session
    Stop(TerminationReason),
}

/// Map a page outcome to the next step
///
/// `retries` is the number of backoffs already taken for the page at
/// `offset`. A throttled response backs off while `retries < max_retries`;
/// once the counter has reached the ceiling the next throttle ends the
/// session, so a page sees at most `max_retries + 1` throttled responses.
/// A ceiling of 0 stops on the first throttle.
pub fn decide(outcome: PageOutcome, offset: u64, retries: u32, max_retries: u32) -> Step {
    match outcome {
        PageOutcome::Records(records) => Step::Advance(records),
        PageOutcome::Empty => Step::Stop(TerminationReason::Completed),
        PageOutcome::Throttled if retries >= max_retries => {
            Step::Stop(TerminationReason::RetriesExhausted {
                offset,
                attempts: retries.saturating_add(1),
            })
        }
        PageOutcome::Throttled => Step::Backoff,
        PageOutcome::Failed { status, message } => Step::Stop(TerminationReason::HardFailure {
            offset,
            status,
            message,
        }),
    }
}

/// Sequential fetch session over a [`PageSource`]
///
/// Owns the offset, the per-page retry counter and the accumulator for the
/// lifetime of one run. At most one request is in flight at a time.
pub struct FetchSession<S, Z = TokioSleeper> {
    source: S,
    sleeper: Z,
    advertiser: String,
    page_size: u32,
    max_retries: u32,
    page_delay: Duration,
    backoff: BackoffPolicy,
    checkpoint: Option<PathBuf>,
}

impl<S: PageSource> FetchSession<S, TokioSleeper> {
    /// Build a session from config, pausing with the tokio timer
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            sleeper: TokioSleeper,
            advertiser: config.fetch.advertiser.clone(),
            page_size: config.fetch.page_size,
            max_retries: config.fetch.max_retries,
            page_delay: config.fetch.page_delay,
            backoff: BackoffPolicy::from_config(&config.retry),
            checkpoint: config
                .output
                .checkpoint_each_page
                .then(|| config.output_path()),
        }
    }
}

impl<S: PageSource, Z: Sleeper> FetchSession<S, Z> {
    /// Replace the sleeper
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> FetchSession<S, Z2> {
        FetchSession {
            source: self.source,
            sleeper,
            advertiser: self.advertiser,
            page_size: self.page_size,
            max_retries: self.max_retries,
            page_delay: self.page_delay,
            backoff: self.backoff,
            checkpoint: self.checkpoint,
        }
    }

    /// Rewrite the artifact at `path` after every page with data
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Drive the result set to completion or to a terminal failure
    pub async fn run(&self) -> SessionOutcome {
        let mut records: Vec<Value> = Vec::new();
        let mut offset: u64 = 0;
        let mut retries: u32 = 0;
        let mut requests: u32 = 0;
        let mut pages: u32 = 0;

        tracing::info!(
            advertiser = %self.advertiser,
            page_size = self.page_size,
            max_retries = self.max_retries,
            "starting fetch session"
        );

        let reason = loop {
            let request = PageRequest {
                advertiser: self.advertiser.clone(),
                offset,
                count: self.page_size,
            };
            requests += 1;
            let outcome = self.source.fetch_page(&request).await;

            match decide(outcome, offset, retries, self.max_retries) {
                Step::Advance(page) => {
                    pages += 1;
                    records.extend(page);
                    tracing::info!(offset, total = records.len(), "page fetched");
                    offset += u64::from(self.page_size);
                    retries = 0;
                    self.write_checkpoint(&records).await;
                    self.sleeper.sleep(self.page_delay).await;
                }
                Step::Backoff => {
                    let delay = self.backoff.next_delay(retries);
                    retries += 1;
                    tracing::warn!(
                        offset,
                        attempt = retries,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        "rate limited, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                }
                Step::Stop(reason) => break reason,
            }
        };

        match &reason {
            TerminationReason::Completed => tracing::info!(
                records = records.len(),
                requests,
                "fetch session completed"
            ),
            other => tracing::warn!(
                reason = %other,
                records = records.len(),
                requests,
                "fetch session stopped early"
            ),
        }

        SessionOutcome {
            records,
            reason,
            requests,
            pages,
        }
    }

    async fn write_checkpoint(&self, records: &[Value]) {
        let Some(path) = &self.checkpoint else {
            return;
        };
        if let Err(e) = artifact::write_artifact(path, records).await {
            tracing::warn!(path = %path.display(), error = %e, "checkpoint write failed");
        }
    }
}

/// Run a full session against the configured API and write the artifact
///
/// The artifact is written once at the end, whatever the termination reason
/// (plus per-page checkpoints when `output.checkpoint_each_page` is set).
/// Errors are returned only for invalid config, client construction and the
/// final write; inspect [`SessionOutcome::reason`] to tell a complete fetch
/// from a truncated one.
pub async fn run_session(config: &Config, token: AccessToken) -> Result<SessionOutcome> {
    config.validate()?;
    let client = AdLibraryClient::new(config.api.clone(), token)?;
    let outcome = FetchSession::new(client, config).run().await;

    let path = config.output_path();
    artifact::write_artifact(&path, &outcome.records).await?;
    tracing::info!(
        path = %path.display(),
        records = outcome.records.len(),
        reason = outcome.reason.label(),
        "artifact saved"
    );
    Ok(outcome)
}
