//! Search-results extraction.
//!
//! Google rewrites its SERP markup regularly, so extraction is a tiered
//! strategy table tried in order — narrower, current selectors first, a
//! broad fallback last. New markup variants are additive rows, not new
//! branches.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::js_scripts;
use crate::browser::PageSession;
use crate::crawl_engine::BlockDetector;
use crate::error::BlockedPage;

/// Search endpoint queried per keyword
pub const SEARCH_URL: &str = "https://www.google.com/search";

/// One ranked organic result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub keyword: String,
    /// 1-based rank among accepted results, dense (no gaps)
    pub position: usize,
    pub url: String,
    pub title: String,
    pub description: String,
    pub captured_at: DateTime<Utc>,
}

/// One selector tier: container plus field mappings
#[derive(Debug, Clone, Copy)]
pub struct SerpStrategy {
    pub name: &'static str,
    pub container: &'static str,
    pub link: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Tiers tried in order; first one matching at least one container wins
pub const SERP_STRATEGIES: &[SerpStrategy] = &[
    SerpStrategy {
        name: "standard",
        container: "div.g",
        link: "a[href]",
        title: "h3",
        description: "div[data-sncf='1'], div.VwiC3b",
    },
    SerpStrategy {
        name: "sokoban",
        container: "div[data-sokoban-container]",
        link: "a[href]",
        title: "h3",
        description: "div.VwiC3b",
    },
    SerpStrategy {
        name: "broad",
        container: "#search div[data-hveid]",
        link: "a[href]",
        title: "h3",
        description: "div[style*='-webkit-line-clamp'], span",
    },
];

/// Build the search-results URL for a keyword
#[must_use]
pub fn search_url(keyword: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("q", keyword);
    serializer.append_pair("hl", "en");
    serializer.append_pair("num", "20");
    format!("{SEARCH_URL}?{}", serializer.finish())
}

/// Raw candidate as collected in-page; required fields still nullable
#[derive(Debug, Deserialize)]
struct RawSerpCandidate {
    url: Option<String>,
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Extract up to `max_results` organic results from a loaded SERP.
///
/// Positions are assigned densely (1, 2, 3, …) in document order among the
/// accepted candidates; a candidate missing its link or title is skipped
/// and does not consume a position number. When no tier matches anything,
/// the page URL is checked against the block detector so a blocked page is
/// reported as a hard failure rather than an empty result set.
pub async fn extract_search_results<P: PageSession>(
    page: &P,
    keyword: &str,
    max_results: usize,
    block_detector: &BlockDetector,
) -> Result<Vec<SearchResultRecord>> {
    for strategy in SERP_STRATEGIES {
        let script = js_scripts::serp_collect_script(strategy, max_results);
        let value = page
            .evaluate(&script)
            .await
            .with_context(|| format!("SERP collection failed (tier '{}')", strategy.name))?;
        let candidates: Vec<RawSerpCandidate> = serde_json::from_value(value)
            .with_context(|| format!("Unexpected SERP candidate shape (tier '{}')", strategy.name))?;

        if candidates.is_empty() {
            debug!("SERP tier '{}' matched nothing for '{keyword}'", strategy.name);
            continue;
        }

        let captured_at = Utc::now();
        let mut records = Vec::new();
        for candidate in candidates {
            if records.len() >= max_results {
                break;
            }
            let (Some(url), Some(title)) = (candidate.url, candidate.title) else {
                // Missing link or title: skip without consuming a position
                continue;
            };
            records.push(SearchResultRecord {
                keyword: keyword.to_string(),
                position: records.len() + 1,
                url,
                title,
                description: candidate.description.unwrap_or_default(),
                captured_at,
            });
        }

        info!(
            "Extracted {} result(s) for '{keyword}' via tier '{}'",
            records.len(),
            strategy.name
        );
        return Ok(records);
    }

    // No tier matched: distinguish "we got blocked" from "page changed"
    if let Some(current) = page.current_url().await
        && block_detector.is_blocked(&current)
    {
        return Err(BlockedPage(current).into());
    }

    info!("No SERP tier matched for '{keyword}', returning empty set");
    Ok(Vec::new())
}
