//! Per-kind pacing and concurrency limits.
//!
//! This is not a hard rate limiter — no token bucket spans targets. It only
//! randomizes per-target pacing and caps in-flight work, which is enough to
//! keep a single-process crawl under the radar of most rate heuristics.

use rand::Rng;
use std::time::Duration;

use crate::config::CrawlKind;

/// Politeness parameters for one crawl kind
#[derive(Debug, Clone)]
pub struct PolitenessProfile {
    /// In-flight target cap for the whole run
    pub max_concurrency: usize,
    /// Bound on one full target attempt (navigate through extraction)
    pub request_timeout: Duration,
    /// Attempts after the first before a target is dropped
    pub max_retries: u32,
    /// Lower bound of the inter-request delay
    pub min_delay_ms: u64,
    /// Upper bound of the inter-request delay
    pub max_delay_ms: u64,
}

impl PolitenessProfile {
    /// Profile for a crawl kind.
    ///
    /// SERP is strictly sequential: parallel querying against a single
    /// search engine is the fastest way to get blocked. Review platforms
    /// are nearly as rate-sensitive; competitor pages tolerate a little
    /// parallelism.
    #[must_use]
    pub fn for_kind(kind: CrawlKind) -> Self {
        match kind {
            CrawlKind::Serp => Self {
                max_concurrency: 1,
                request_timeout: Duration::from_secs(30),
                max_retries: 3,
                min_delay_ms: 2_000,
                max_delay_ms: 5_000,
            },
            CrawlKind::Competitor => Self {
                max_concurrency: 2,
                request_timeout: Duration::from_secs(30),
                max_retries: 3,
                min_delay_ms: 1_000,
                max_delay_ms: 3_000,
            },
            CrawlKind::Review => Self {
                max_concurrency: 1,
                request_timeout: Duration::from_secs(45),
                max_retries: 2,
                min_delay_ms: 2_000,
                max_delay_ms: 6_000,
            },
        }
    }

    /// Override the delay bounds (caller-supplied pacing for SERP runs)
    #[must_use]
    pub fn with_delay_range(mut self, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.min_delay_ms = min_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Draw a delay uniformly from `[min_delay_ms, max_delay_ms]`.
    ///
    /// The caller must suspend for this duration before invoking the
    /// extraction adapter.
    #[must_use]
    pub fn jittered_delay(&self) -> Duration {
        let ms = if self.min_delay_ms >= self.max_delay_ms {
            self.min_delay_ms
        } else {
            rand::rng().random_range(self.min_delay_ms..=self.max_delay_ms)
        };
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serp_profile_is_strictly_sequential() {
        let profile = PolitenessProfile::for_kind(CrawlKind::Serp);
        assert_eq!(profile.max_concurrency, 1);
    }

    #[test]
    fn competitor_profile_allows_low_concurrency() {
        let profile = PolitenessProfile::for_kind(CrawlKind::Competitor);
        assert_eq!(profile.max_concurrency, 2);
    }

    #[test]
    fn review_profile_is_sequential() {
        let profile = PolitenessProfile::for_kind(CrawlKind::Review);
        assert_eq!(profile.max_concurrency, 1);
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let profile =
            PolitenessProfile::for_kind(CrawlKind::Serp).with_delay_range(100, 200);
        for _ in 0..100 {
            let delay = profile.jittered_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn jittered_delay_handles_degenerate_range() {
        let profile = PolitenessProfile::for_kind(CrawlKind::Serp).with_delay_range(50, 50);
        assert_eq!(profile.jittered_delay(), Duration::from_millis(50));
    }
}
