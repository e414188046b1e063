//! Request types for the three crawl operations.
//!
//! Each request carries its own `validate()` which is run before any browser
//! resource is acquired. Validation failures are the only errors that fail
//! fast; everything downstream degrades to partial results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CrawlError, CrawlResult};

/// The three crawl kinds, used to select politeness profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlKind {
    Serp,
    Competitor,
    Review,
}

impl fmt::Display for CrawlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serp => write!(f, "serp"),
            Self::Competitor => write!(f, "competitor"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Review platform a [`ReviewSource`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSourceType {
    Google,
    Trustpilot,
    G2,
}

impl fmt::Display for ReviewSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Trustpilot => write!(f, "trustpilot"),
            Self::G2 => write!(f, "g2"),
        }
    }
}

impl std::str::FromStr for ReviewSourceType {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "trustpilot" => Ok(Self::Trustpilot),
            "g2" => Ok(Self::G2),
            other => Err(CrawlError::InvalidInput(format!(
                "Unknown review source type '{other}' (expected google, trustpilot, or g2)"
            ))),
        }
    }
}

/// Request for a SERP crawl: one target page per keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpRequest {
    /// Keywords to query, one search-results page each
    pub keywords: Vec<String>,
    /// Maximum organic results to extract per keyword
    pub max_results: usize,
    /// Optional proxy endpoints; empty list means direct connection
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Lower bound of the politeness delay in milliseconds
    pub min_delay_ms: u64,
    /// Upper bound of the politeness delay in milliseconds
    pub max_delay_ms: u64,
}

impl SerpRequest {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            max_results: 10,
            proxies: Vec::new(),
            min_delay_ms: 2_000,
            max_delay_ms: 5_000,
        }
    }

    /// Validate before acquiring any browser resources
    pub fn validate(&self) -> CrawlResult<()> {
        if self.keywords.is_empty() {
            return Err(CrawlError::InvalidInput(
                "keywords must be a non-empty list".to_string(),
            ));
        }
        if let Some(bad) = self.keywords.iter().find(|k| k.trim().is_empty()) {
            return Err(CrawlError::InvalidInput(format!(
                "keyword {bad:?} is empty or whitespace-only"
            )));
        }
        if self.max_results == 0 {
            return Err(CrawlError::InvalidInput(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(CrawlError::InvalidInput(format!(
                "min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

/// Request for a competitor content crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRequest {
    /// Pages to snapshot and diff against history
    pub urls: Vec<String>,
    /// When true, the new snapshot replaces the stored one; when false the
    /// comparison is read-only and history is left untouched
    pub persist_snapshots: bool,
    /// Directory backing the snapshot store
    pub snapshot_dir: std::path::PathBuf,
}

impl CompetitorRequest {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            persist_snapshots: true,
            snapshot_dir: std::path::PathBuf::from("./snapshots"),
        }
    }

    /// Validate before acquiring any browser resources
    pub fn validate(&self) -> CrawlResult<()> {
        if self.urls.is_empty() {
            return Err(CrawlError::InvalidInput(
                "urls must be a non-empty list".to_string(),
            ));
        }
        for url in &self.urls {
            validate_crawl_url(url)?;
        }
        Ok(())
    }
}

/// One review platform page to aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSource {
    #[serde(rename = "type")]
    pub source_type: ReviewSourceType,
    pub url: String,
    pub business_name: String,
}

/// Request for a review aggregation crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub sources: Vec<ReviewSource>,
    /// Hard cap on reviews extracted per source page
    pub max_reviews_per_source: usize,
}

impl ReviewRequest {
    pub fn new(sources: Vec<ReviewSource>) -> Self {
        Self {
            sources,
            max_reviews_per_source: 20,
        }
    }

    /// Validate before acquiring any browser resources
    pub fn validate(&self) -> CrawlResult<()> {
        if self.sources.is_empty() {
            return Err(CrawlError::InvalidInput(
                "sources must be a non-empty list".to_string(),
            ));
        }
        if self.max_reviews_per_source == 0 {
            return Err(CrawlError::InvalidInput(
                "max_reviews_per_source must be at least 1".to_string(),
            ));
        }
        for source in &self.sources {
            validate_crawl_url(&source.url)?;
            if source.business_name.trim().is_empty() {
                return Err(CrawlError::InvalidInput(format!(
                    "business_name for {} is empty",
                    source.url
                )));
            }
        }
        Ok(())
    }
}

/// Check that a URL is well-formed and uses an http(s) scheme
fn validate_crawl_url(raw: &str) -> CrawlResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| CrawlError::InvalidInput(format!("'{raw}' is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CrawlError::InvalidInput(format!(
            "'{raw}' has unsupported scheme '{other}' (expected http or https)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serp_request_rejects_empty_keywords() {
        let request = SerpRequest::new(vec![]);
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidInput(_))
        ));
    }

    #[test]
    fn serp_request_rejects_blank_keyword() {
        let request = SerpRequest::new(vec!["rust crates".to_string(), "   ".to_string()]);
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidInput(_))
        ));
    }

    #[test]
    fn serp_request_rejects_inverted_delay_range() {
        let mut request = SerpRequest::new(vec!["rust crates".to_string()]);
        request.min_delay_ms = 5_000;
        request.max_delay_ms = 2_000;
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidInput(_))
        ));
    }

    #[test]
    fn competitor_request_rejects_malformed_url() {
        let request = CompetitorRequest::new(vec!["not a url".to_string()]);
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidInput(_))
        ));
    }

    #[test]
    fn competitor_request_rejects_non_http_scheme() {
        let request = CompetitorRequest::new(vec!["ftp://example.com/".to_string()]);
        assert!(matches!(
            request.validate(),
            Err(CrawlError::InvalidInput(_))
        ));
    }

    #[test]
    fn review_source_type_parses_case_insensitively() {
        assert_eq!(
            "Trustpilot".parse::<ReviewSourceType>().unwrap(),
            ReviewSourceType::Trustpilot
        );
        assert!("yelp".parse::<ReviewSourceType>().is_err());
    }
}
