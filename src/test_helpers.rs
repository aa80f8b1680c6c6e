//! Shared test fixtures: scripted page sources and a recording sleeper

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::client::PageSource;
use crate::config::{Config, FetchConfig, RetryConfig};
use crate::retry::Sleeper;
use crate::types::{PageOutcome, PageRequest};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Config with one-second backoff units and a five-second page delay
pub(crate) fn test_config(page_size: u32, max_retries: u32) -> Config {
    Config {
        fetch: FetchConfig {
            advertiser: "airbnb".into(),
            page_size,
            max_retries,
            page_delay: Duration::from_secs(5),
        },
        retry: RetryConfig {
            backoff_unit: Duration::from_secs(1),
            max_delay: None,
            jitter: false,
        },
        ..Default::default()
    }
}

/// `count` distinct records numbered from `first`
pub(crate) fn full_page(first: u64, count: u64) -> Vec<Value> {
    (first..first + count)
        .map(|i| json!({"adUrl": format!("https://example.com/ad/{i}")}))
        .collect()
}

/// Page source that replays a fixed script and records every request
#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    script: Arc<Mutex<VecDeque<PageOutcome>>>,
    fallback: Option<PageOutcome>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl ScriptedSource {
    /// Replay `script`; an exhausted script answers with an empty page
    pub(crate) fn new(script: Vec<PageOutcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Default::default()
        }
    }

    /// Answer every request with `outcome`
    pub(crate) fn repeating(outcome: PageOutcome) -> Self {
        Self {
            fallback: Some(outcome),
            ..Default::default()
        }
    }

    /// Offsets of all requests, in order
    pub(crate) fn offsets(&self) -> Vec<u64> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.offset)
            .collect()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> PageOutcome {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.or_else(|| self.fallback.clone())
            .unwrap_or(PageOutcome::Empty)
    }
}

/// Sleeper that returns immediately and remembers each requested pause
#[derive(Clone, Default)]
pub(crate) struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
