//! Ad library HTTP client
//!
//! [`AdLibraryClient`] issues one GET per page and classifies the result into
//! a [`PageOutcome`]. Classification never fails: transport errors and
//! unusable bodies become [`PageOutcome::Failed`].

use crate::config::ApiConfig;
use crate::error::Result;
use crate::types::{AccessToken, PageOutcome, PageRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// Source of result pages
///
/// Implemented by [`AdLibraryClient`] for the real API; tests substitute
/// scripted sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch and classify one page
    async fn fetch_page(&self, request: &PageRequest) -> PageOutcome;
}

/// Client for the paginated ad library endpoint
pub struct AdLibraryClient {
    http: reqwest::Client,
    config: ApiConfig,
    token: AccessToken,
}

impl AdLibraryClient {
    /// Build a client; the token is sent unchanged on every request
    pub fn new(config: ApiConfig, token: AccessToken) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            token,
        })
    }

    fn request(&self, page: &PageRequest) -> reqwest::RequestBuilder {
        self.http
            .get(&self.config.base_url)
            .bearer_auth(self.token.expose())
            .header("LinkedIn-Version", &self.config.api_version)
            .header("X-Restli-Protocol-Version", &self.config.protocol_version)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[
                ("advertiser", page.advertiser.as_str()),
                ("q", self.config.search_criteria.as_str()),
            ])
            .query(&[("start", page.offset)])
            .query(&[("count", page.count)])
    }
}

#[async_trait]
impl PageSource for AdLibraryClient {
    async fn fetch_page(&self, request: &PageRequest) -> PageOutcome {
        tracing::debug!(
            advertiser = %request.advertiser,
            offset = request.offset,
            count = request.count,
            "requesting page"
        );

        let response = match self.request(request).send().await {
            Ok(response) => response,
            Err(e) => {
                return PageOutcome::Failed {
                    status: None,
                    message: format!("request failed: {e}"),
                };
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return PageOutcome::Throttled;
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return PageOutcome::Failed {
                status: Some(status.as_u16()),
                message: format!("unexpected status {status}: {}", truncate(&body, 200)),
            };
        }

        match response.json::<Value>().await {
            Ok(body) => classify_body(body),
            Err(e) => PageOutcome::Failed {
                status: Some(status.as_u16()),
                message: format!("failed to decode body: {e}"),
            },
        }
    }
}

/// Classify a successfully decoded 200 body
///
/// A missing `elements` field counts as an empty page. A body that is not an
/// object, or an `elements` that is not an array, is a failure.
pub fn classify_body(body: Value) -> PageOutcome {
    let Value::Object(mut map) = body else {
        return PageOutcome::Failed {
            status: Some(200),
            message: "response body is not a JSON object".to_string(),
        };
    };

    match map.remove("elements") {
        None | Some(Value::Null) => PageOutcome::Empty,
        Some(Value::Array(elements)) if elements.is_empty() => PageOutcome::Empty,
        Some(Value::Array(elements)) => PageOutcome::Records(elements),
        Some(other) => PageOutcome::Failed {
            status: Some(200),
            message: format!("`elements` is not an array (found {})", json_kind(&other)),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
