//! Mock ad library server and config helpers for integration tests

use adlibrary_fetch::config::{ApiConfig, Config, FetchConfig, OutputConfig, RetryConfig};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Endpoint path served by the mock
pub const ENDPOINT: &str = "/rest/adLibrary";

/// Config pointing at `server`, writing into `dir`, with millisecond pauses
pub fn config_for(server: &MockServer, dir: &Path, page_size: u32, max_retries: u32) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), ENDPOINT),
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        fetch: FetchConfig {
            advertiser: "airbnb".into(),
            page_size,
            max_retries,
            page_delay: Duration::from_millis(1),
        },
        retry: RetryConfig {
            backoff_unit: Duration::from_millis(10),
            max_delay: None,
            jitter: false,
        },
        output: OutputConfig {
            path: Some(dir.join("airbnb_all_ads.json")),
            checkpoint_each_page: false,
        },
    }
}

/// `count` records numbered from `first`
pub fn ads(first: u64, count: u64) -> Vec<Value> {
    (first..first + count)
        .map(|i| json!({"adUrl": format!("https://example.com/ad/{i}"), "seq": i}))
        .collect()
}

/// Serve `records` for the page starting at `start`
pub async fn mount_page(server: &MockServer, start: u64, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": records })))
        .expect(1)
        .named(format!("page at {start}"))
        .mount(server)
        .await;
}

/// Answer the page at `start` with `status`, at most `times` times
///
/// Must be mounted before any success mock for the same page.
pub async fn mount_status(server: &MockServer, start: u64, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(times)
        .expect(times)
        .named(format!("status {status} at {start}"))
        .mount(server)
        .await;
}

/// Offsets of every request the server received, in order
pub async fn requested_offsets(server: &MockServer) -> Vec<u64> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|req| {
            req.url
                .query_pairs()
                .find(|(k, _)| k == "start")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}
