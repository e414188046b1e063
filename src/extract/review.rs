//! Review extraction and aggregation across platforms.
//!
//! Each platform gets its own tiered strategy table. Ratings stay on the
//! source-native scale; dates are kept only when they are already ISO-8601
//! (relative dates like "2 weeks ago" become empty strings).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::js_scripts;
use crate::browser::PageSession;
use crate::config::ReviewSourceType;

/// Pixels per auto-scroll step
pub const SCROLL_STEP_PX: u32 = 600;
/// Upper bound on auto-scroll iterations
pub const MAX_SCROLL_STEPS: u32 = 8;
/// Pause between scroll steps so lazy loaders can fire
const SCROLL_SETTLE: std::time::Duration = std::time::Duration::from_millis(300);

/// One extracted review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub source_type: ReviewSourceType,
    pub business_name: String,
    pub reviewer_name: String,
    /// Source-native scale (all three platforms use 1–5)
    pub rating: f64,
    pub review_text: String,
    /// ISO-8601 date, or empty when the platform only shows relative dates
    pub review_date: String,
    pub captured_at: DateTime<Utc>,
}

/// Reviews for one source page plus derived statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAggregate {
    pub source_type: ReviewSourceType,
    pub business_name: String,
    /// Ordered as extracted from the page
    pub reviews: Vec<ReviewRecord>,
    /// Mean rating rounded to 2 decimals; 0 when there are no reviews
    pub average_rating: f64,
    pub total_reviews: usize,
}

/// One selector tier for a review platform
#[derive(Debug, Clone, Copy)]
pub struct ReviewStrategy {
    pub name: &'static str,
    pub container: &'static str,
    pub reviewer: &'static str,
    pub reviewer_attr: Option<&'static str>,
    pub rating: &'static str,
    /// Attribute holding the rating value; `None` reads text content
    pub rating_attr: Option<&'static str>,
    pub text: &'static str,
    pub date: &'static str,
    pub date_attr: Option<&'static str>,
}

const TRUSTPILOT_STRATEGIES: &[ReviewStrategy] = &[
    ReviewStrategy {
        name: "review-card",
        container: "article[data-service-review-card-paper]",
        reviewer: "[data-consumer-name-typography]",
        reviewer_attr: None,
        rating: "[data-service-review-rating]",
        rating_attr: Some("data-service-review-rating"),
        text: "[data-service-review-text-typography]",
        date: "time",
        date_attr: Some("datetime"),
    },
    ReviewStrategy {
        name: "legacy-card",
        container: "div.review-card, article.review",
        reviewer: ".consumer-information__name",
        reviewer_attr: None,
        rating: "div.star-rating img",
        rating_attr: Some("alt"),
        text: "p.review-content__text",
        date: "time",
        date_attr: Some("datetime"),
    },
];

const G2_STRATEGIES: &[ReviewStrategy] = &[
    ReviewStrategy {
        name: "itemprop",
        container: "div[itemprop='review']",
        reviewer: "[itemprop='author'] [itemprop='name'], span[itemprop='name']",
        reviewer_attr: None,
        rating: "[itemprop='ratingValue']",
        rating_attr: Some("content"),
        text: "[itemprop='reviewBody']",
        date: "meta[itemprop='datePublished']",
        date_attr: Some("content"),
    },
    ReviewStrategy {
        name: "paper",
        container: "div.paper.paper--white",
        reviewer: ".consumer-name, .mb-half a",
        reviewer_attr: None,
        rating: ".stars",
        rating_attr: Some("class"),
        text: ".review-body, div[itemprop='reviewBody']",
        date: "time",
        date_attr: Some("datetime"),
    },
];

const GOOGLE_STRATEGIES: &[ReviewStrategy] = &[
    ReviewStrategy {
        name: "review-id",
        container: "div[data-review-id]",
        reviewer: ".d4r55",
        reviewer_attr: None,
        rating: "span[role='img']",
        rating_attr: Some("aria-label"),
        text: "span.wiI7pd",
        date: "span.rsqaWe",
        date_attr: None,
    },
    ReviewStrategy {
        name: "broad",
        container: "div.jftiEf",
        reviewer: "div.d4r55, a[aria-label]",
        reviewer_attr: None,
        rating: "span[role='img']",
        rating_attr: Some("aria-label"),
        text: "span.wiI7pd, span[jscontroller]",
        date: "span.rsqaWe",
        date_attr: None,
    },
];

/// Expander candidates tried before extraction on Google sources
const GOOGLE_MORE_REVIEWS_SELECTORS: &[&str] = &[
    "button[jsaction*='moreReviews']",
    "a[data-async-trigger='reviewDialog']",
    "button[aria-label*='reviews']",
];

/// Strategy table for a platform
#[must_use]
pub fn strategies_for(source_type: ReviewSourceType) -> &'static [ReviewStrategy] {
    match source_type {
        ReviewSourceType::Trustpilot => TRUSTPILOT_STRATEGIES,
        ReviewSourceType::G2 => G2_STRATEGIES,
        ReviewSourceType::Google => GOOGLE_STRATEGIES,
    }
}

/// Raw candidate as collected in-page
#[derive(Debug, Deserialize)]
struct RawReviewCandidate {
    reviewer: Option<String>,
    rating_raw: Option<String>,
    text: Option<String>,
    date_raw: Option<String>,
}

/// Scroll down in fixed steps to trigger lazy-loaded reviews, stopping
/// early once the scroll position stops advancing.
async fn auto_scroll<P: PageSession>(page: &P) {
    let script = js_scripts::scroll_step_script(SCROLL_STEP_PX);
    let mut last_offset: i64 = -1;
    for step in 0..MAX_SCROLL_STEPS {
        let offset = match page.evaluate(&script).await {
            Ok(value) => value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)),
            Err(e) => {
                debug!("Scroll step failed: {e:#}");
                return;
            }
        };
        let Some(offset) = offset else { return };
        if offset <= last_offset {
            debug!("Scroll position static after {step} step(s)");
            return;
        }
        last_offset = offset;
        tokio::time::sleep(SCROLL_SETTLE).await;
    }
}

/// Extract up to `max_reviews` reviews from a loaded platform page.
///
/// A candidate without review text is skipped, not fatal; the same goes for
/// one whose rating cannot be parsed as a number.
pub async fn extract_reviews<P: PageSession>(
    page: &P,
    source_type: ReviewSourceType,
    business_name: &str,
    max_reviews: usize,
) -> Result<Vec<ReviewRecord>> {
    if source_type == ReviewSourceType::Google {
        for selector in GOOGLE_MORE_REVIEWS_SELECTORS {
            if let Ok(true) = page.click(selector).await {
                debug!("Expanded reviews via '{selector}'");
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                break;
            }
        }
    }

    auto_scroll(page).await;

    for strategy in strategies_for(source_type) {
        let script = js_scripts::review_collect_script(strategy, max_reviews);
        let value = page.evaluate(&script).await.with_context(|| {
            format!("Review collection failed ({source_type}, tier '{}')", strategy.name)
        })?;
        let candidates: Vec<RawReviewCandidate> = serde_json::from_value(value).with_context(|| {
            format!(
                "Unexpected review candidate shape ({source_type}, tier '{}')",
                strategy.name
            )
        })?;

        if candidates.is_empty() {
            debug!(
                "Review tier '{}' matched nothing on {source_type} page",
                strategy.name
            );
            continue;
        }

        let captured_at = Utc::now();
        let mut records = Vec::new();
        for candidate in candidates {
            if records.len() >= max_reviews {
                break;
            }
            let Some(text) = candidate.text.filter(|t| !t.is_empty()) else {
                continue;
            };
            let Some(rating) = candidate.rating_raw.as_deref().and_then(parse_rating) else {
                continue;
            };
            records.push(ReviewRecord {
                source_type,
                business_name: business_name.to_string(),
                reviewer_name: candidate.reviewer.unwrap_or_default(),
                rating,
                review_text: text,
                review_date: candidate
                    .date_raw
                    .as_deref()
                    .map(normalize_review_date)
                    .unwrap_or_default(),
                captured_at,
            });
        }

        info!(
            "Extracted {} review(s) from {source_type} via tier '{}'",
            records.len(),
            strategy.name
        );
        return Ok(records);
    }

    info!("No review tier matched on {source_type} page for '{business_name}'");
    Ok(Vec::new())
}

/// Compute the aggregate for one source page.
///
/// `average_rating` is 0 when there are no reviews (division-by-zero
/// guard), otherwise the mean rounded to 2 decimals.
#[must_use]
pub fn aggregate(
    source_type: ReviewSourceType,
    business_name: &str,
    reviews: Vec<ReviewRecord>,
) -> ReviewAggregate {
    let total_reviews = reviews.len();
    let average_rating = if total_reviews == 0 {
        0.0
    } else {
        let sum: f64 = reviews.iter().map(|r| r.rating).sum();
        (sum / total_reviews as f64 * 100.0).round() / 100.0
    };
    ReviewAggregate {
        source_type,
        business_name: business_name.to_string(),
        reviews,
        average_rating,
        total_reviews,
    }
}

/// Pull the first numeric token out of a raw rating string.
///
/// Handles bare numbers ("5"), attribute values ("4.0"), and label text
/// ("Rated 4.5 out of 5 stars").
#[must_use]
pub fn parse_rating(raw: &str) -> Option<f64> {
    raw.split(|c: char| !c.is_ascii_digit() && c != '.')
        .filter(|token| !token.is_empty())
        .find_map(|token| token.parse::<f64>().ok())
}

/// Keep a date string only when it is already ISO-8601.
///
/// Platforms that render relative dates ("2 weeks ago") yield an empty
/// string — the field is documented as ISO-8601 or empty.
#[must_use]
pub fn normalize_review_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if DateTime::parse_from_rfc3339(trimmed).is_ok()
        || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
    {
        trimmed.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rating_reads_bare_and_labelled_values() {
        assert_eq!(parse_rating("5"), Some(5.0));
        assert_eq!(parse_rating("4.0"), Some(4.0));
        assert_eq!(parse_rating("Rated 4.5 out of 5 stars"), Some(4.5));
        assert_eq!(parse_rating("no digits here"), None);
    }

    #[test]
    fn normalize_review_date_keeps_iso_only() {
        assert_eq!(
            normalize_review_date("2026-03-01T10:30:00+00:00"),
            "2026-03-01T10:30:00+00:00"
        );
        assert_eq!(normalize_review_date("2026-03-01"), "2026-03-01");
        assert_eq!(normalize_review_date("2 weeks ago"), "");
    }

    #[test]
    fn aggregate_guards_against_empty_review_set() {
        let agg = aggregate(ReviewSourceType::G2, "Acme", vec![]);
        assert_eq!(agg.average_rating, 0.0);
        assert_eq!(agg.total_reviews, 0);
    }

    #[test]
    fn aggregate_rounds_mean_to_two_decimals() {
        let review = |rating: f64| ReviewRecord {
            source_type: ReviewSourceType::Trustpilot,
            business_name: "Acme".to_string(),
            reviewer_name: "A".to_string(),
            rating,
            review_text: "ok".to_string(),
            review_date: String::new(),
            captured_at: Utc::now(),
        };
        let agg = aggregate(
            ReviewSourceType::Trustpilot,
            "Acme",
            vec![review(5.0), review(4.0), review(4.0)],
        );
        // 13 / 3 = 4.333... → 4.33
        assert_eq!(agg.average_rating, 4.33);
        assert_eq!(agg.total_reviews, 3);
    }
}
