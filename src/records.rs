//! Tolerant read-only view over saved ad records
//!
//! Records are opaque upstream objects. Every accessor here treats a missing
//! or malformed field as absent instead of failing, so a single odd record
//! never spoils a summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// Impression range reported by the API (`totalImpressions`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpressionRange {
    /// Lower bound
    pub from: f64,
    /// Upper bound
    pub to: f64,
}

impl ImpressionRange {
    /// Midpoint of the range
    pub fn midpoint(&self) -> f64 {
        (self.from + self.to) / 2.0
    }
}

/// Share of impressions served in one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShare {
    /// Country URN, e.g. `urn:li:country:NL`
    pub country: String,
    /// Percentage of impressions
    pub percentage: f64,
}

/// One targeting facet (`adTargeting` entry)
#[derive(Debug, Clone, PartialEq)]
pub struct TargetingFacet {
    /// Facet name, e.g. `Location`
    pub facet_name: String,
    /// Segments included by the facet
    pub included_segments: Vec<String>,
}

/// Typed view of one ad record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdRecord {
    /// Public URL of the ad
    pub ad_url: Option<String>,
    /// First impression time
    pub first_impression_at: Option<DateTime<Utc>>,
    /// Latest impression time
    pub latest_impression_at: Option<DateTime<Utc>>,
    /// Reported impression range
    pub total_impressions: Option<ImpressionRange>,
    /// Impression distribution by country
    pub countries: Vec<CountryShare>,
    /// Targeting facets
    pub targeting: Vec<TargetingFacet>,
}

impl AdRecord {
    /// Extract the known fields of `value`, skipping anything missing or malformed
    pub fn from_value(value: &Value) -> Self {
        let details = value.get("details");
        let stats = details.and_then(|d| d.get("adStatistics"));

        Self {
            ad_url: value
                .get("adUrl")
                .and_then(Value::as_str)
                .map(str::to_string),
            first_impression_at: stats
                .and_then(|s| s.get("firstImpressionAt"))
                .and_then(timestamp_millis),
            latest_impression_at: stats
                .and_then(|s| s.get("latestImpressionAt"))
                .and_then(timestamp_millis),
            total_impressions: stats
                .and_then(|s| s.get("totalImpressions"))
                .and_then(impression_range),
            countries: stats
                .and_then(|s| s.get("impressionsDistributionByCountry"))
                .and_then(Value::as_array)
                .map(|entries| entries.iter().filter_map(country_share).collect())
                .unwrap_or_default(),
            targeting: details
                .and_then(|d| d.get("adTargeting"))
                .and_then(Value::as_array)
                .map(|entries| entries.iter().filter_map(targeting_facet).collect())
                .unwrap_or_default(),
        }
    }

    /// True when both impression timestamps are present
    pub fn has_statistics(&self) -> bool {
        self.first_impression_at.is_some() && self.latest_impression_at.is_some()
    }

    /// Impression percentage for `country`, zero when not listed
    pub fn country_share(&self, country: &str) -> f64 {
        self.countries
            .iter()
            .find(|c| c.country == country)
            .map(|c| c.percentage)
            .unwrap_or(0.0)
    }

    /// Midpoint of the reported impression range
    pub fn impression_midpoint(&self) -> Option<f64> {
        self.total_impressions.map(|r| r.midpoint())
    }

    /// Days between first and latest impression, counting both ends
    pub fn active_days(&self) -> Option<i64> {
        let first = self.first_impression_at?;
        let latest = self.latest_impression_at?;
        Some((latest - first).num_days() + 1)
    }

    /// Segments of every `Location` facet
    pub fn location_segments(&self) -> Vec<&str> {
        self.targeting
            .iter()
            .filter(|t| t.facet_name == "Location")
            .flat_map(|t| t.included_segments.iter().map(String::as_str))
            .collect()
    }

    /// Whether any location segment contains `needle`, ignoring case
    pub fn targets_location(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.location_segments()
            .iter()
            .any(|seg| seg.to_lowercase().contains(&needle))
    }
}

/// Aggregate view of an artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtifactSummary {
    /// Records in the artifact
    pub total: usize,
    /// Records carrying both impression timestamps
    pub with_statistics: usize,
    /// Earliest first-impression date
    pub first_impression: Option<NaiveDate>,
    /// Latest latest-impression date
    pub latest_impression: Option<NaiveDate>,
    /// Sum of impression range midpoints
    pub estimated_impressions: f64,
}

/// Summarize a set of records
pub fn summarize(records: &[Value]) -> ArtifactSummary {
    let mut summary = ArtifactSummary {
        total: records.len(),
        ..Default::default()
    };

    for record in records.iter().map(AdRecord::from_value) {
        if !record.has_statistics() {
            continue;
        }
        summary.with_statistics += 1;
        summary.estimated_impressions += record.impression_midpoint().unwrap_or(0.0);

        let first = record.first_impression_at.map(|t| t.date_naive());
        let latest = record.latest_impression_at.map(|t| t.date_naive());
        summary.first_impression = match (summary.first_impression, first) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        summary.latest_impression = match (summary.latest_impression, latest) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    summary
}

fn timestamp_millis(value: &Value) -> Option<DateTime<Utc>> {
    let millis = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp_millis(millis)
}

fn impression_range(value: &Value) -> Option<ImpressionRange> {
    Some(ImpressionRange {
        from: value.get("from")?.as_f64()?,
        to: value.get("to")?.as_f64()?,
    })
}

fn country_share(value: &Value) -> Option<CountryShare> {
    Some(CountryShare {
        country: value.get("country")?.as_str()?.to_string(),
        percentage: value.get("impressionPercentage")?.as_f64()?,
    })
}

fn targeting_facet(value: &Value) -> Option<TargetingFacet> {
    let facet_name = value.get("facetName")?.as_str()?.to_string();
    let included_segments = value
        .get("includedSegments")
        .and_then(Value::as_array)
        .map(|segs| {
            segs.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(TargetingFacet {
        facet_name,
        included_segments,
    })
}
