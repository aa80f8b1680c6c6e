//! Exponential backoff for throttled page requests
//!
//! Throttled attempt `n` (counting from zero) waits `2^n` backoff units:
//! 1, 2, 4, 8, ... with the default one-second unit. Pauses go through the
//! [`Sleeper`] trait so the schedule can be observed without waiting.
//!
//! # Example
//!
//! ```
//! use adlibrary_fetch::config::RetryConfig;
//! use adlibrary_fetch::retry::BackoffPolicy;
//! use std::time::Duration;
//!
//! let policy = BackoffPolicy::from_config(&RetryConfig::default());
//! assert_eq!(policy.delay_for(0), Duration::from_secs(1));
//! assert_eq!(policy.delay_for(3), Duration::from_secs(8));
//! ```

use crate::config::RetryConfig;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Largest exponent used before the schedule saturates
const MAX_EXPONENT: u32 = 31;

/// Something that can pause the session
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration` before returning
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backoff schedule for throttled responses
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    unit: Duration,
    max_delay: Option<Duration>,
    jitter: bool,
}

impl BackoffPolicy {
    /// Build the schedule from config
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            unit: config.backoff_unit,
            max_delay: config.max_delay,
            jitter: config.jitter,
        }
    }

    /// Delay before re-issuing a page that has been throttled `retry` times
    ///
    /// Deterministic: `2^retry * unit`, capped by `max_delay`. Jitter is
    /// applied separately by [`BackoffPolicy::next_delay`].
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.min(MAX_EXPONENT);
        let delay = self.unit.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Delay actually slept, with jitter when enabled
    pub fn next_delay(&self, retry: u32) -> Duration {
        let delay = self.delay_for(retry);
        if self.jitter { add_jitter(delay) } else { delay }
    }
}

/// Add random jitter to a delay
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
