//! Configuration types for adlibrary-fetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable holding the bearer token
pub const ACCESS_TOKEN_ENV: &str = "LI_ACCESS_TOKEN";

/// Upstream API endpoint and protocol settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Ad library endpoint (default: "https://api.linkedin.com/rest/adLibrary")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value sent in the `LinkedIn-Version` header (default: "202507")
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Value sent in the `X-Restli-Protocol-Version` header (default: "2.0.0")
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,

    /// Finder name sent as the `q` query parameter (default: "criteria")
    #[serde(default = "default_search_criteria")]
    pub search_criteria: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            protocol_version: default_protocol_version(),
            search_criteria: default_search_criteria(),
            timeout: default_timeout(),
        }
    }
}

/// Pagination settings for one fetch session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Advertiser whose records are fetched (default: "airbnb")
    #[serde(default = "default_advertiser")]
    pub advertiser: String,

    /// Records requested per page, fixed for the session (default: 25)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Backoffs allowed for a single page before it is abandoned (default: 5)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Courtesy pause after every page with data (default: 5 seconds)
    #[serde(default = "default_page_delay", with = "duration_serde")]
    pub page_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            advertiser: default_advertiser(),
            page_size: default_page_size(),
            max_retries: default_max_retries(),
            page_delay: default_page_delay(),
        }
    }
}

/// Backoff applied to throttled responses
///
/// Throttled attempt `n` (counting from zero) waits `2^n * backoff_unit`,
/// optionally capped by `max_delay` and stretched by jitter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Unit the exponential schedule is expressed in (default: 1 second)
    #[serde(default = "default_backoff_unit", with = "duration_serde")]
    pub backoff_unit: Duration,

    /// Upper bound for a single backoff (default: unbounded)
    #[serde(default, with = "optional_duration_serde")]
    pub max_delay: Option<Duration>,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_unit: default_backoff_unit(),
            max_delay: None,
            jitter: false,
        }
    }
}

/// Output artifact settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact path (default: "<advertiser>_all_ads.json")
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Rewrite the artifact after every page with data (default: false)
    #[serde(default)]
    pub checkpoint_each_page: bool,
}

/// Main configuration for a fetch run
///
/// All sections have defaults, so an empty JSON object is a valid config.
/// The bearer token is deliberately not part of this struct; it is supplied
/// separately as an [`AccessToken`](crate::types::AccessToken).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pagination settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Throttling backoff settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Output artifact settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load a config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make a session meaningless
    pub fn validate(&self) -> Result<()> {
        if self.fetch.advertiser.trim().is_empty() {
            return Err(Error::config("fetch.advertiser", "advertiser must not be empty"));
        }
        if self.fetch.page_size == 0 {
            return Err(Error::config("fetch.page_size", "page size must be positive"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| Error::config("api.base_url", format!("invalid base URL: {e}")))?;
        Ok(())
    }

    /// Resolved artifact path
    pub fn output_path(&self) -> PathBuf {
        self.output
            .path
            .clone()
            .unwrap_or_else(|| crate::artifact::default_file_name(&self.fetch.advertiser))
    }
}

fn default_base_url() -> String {
    "https://api.linkedin.com/rest/adLibrary".to_string()
}

fn default_api_version() -> String {
    "202507".to_string()
}

fn default_protocol_version() -> String {
    "2.0.0".to_string()
}

fn default_search_criteria() -> String {
    "criteria".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_advertiser() -> String {
    "airbnb".to_string()
}

fn default_page_size() -> u32 {
    25
}

fn default_max_retries() -> u32 {
    5
}

fn default_page_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_unit() -> Duration {
    Duration::from_secs(1)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
