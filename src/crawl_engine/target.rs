//! Units of crawl work.

use crate::config::ReviewSourceType;

/// One unit of work: a URL plus kind-specific context.
///
/// Immutable once enqueued; consumed exactly once by the orchestrator.
#[derive(Debug, Clone)]
pub struct Target {
    pub url: String,
    pub context: TargetContext,
}

/// Kind-specific payload carried alongside the URL
#[derive(Debug, Clone)]
pub enum TargetContext {
    Serp {
        keyword: String,
    },
    Competitor,
    Review {
        source_type: ReviewSourceType,
        business_name: String,
    },
}

impl Target {
    #[must_use]
    pub fn serp(url: String, keyword: String) -> Self {
        Self {
            url,
            context: TargetContext::Serp { keyword },
        }
    }

    #[must_use]
    pub fn competitor(url: String) -> Self {
        Self {
            url,
            context: TargetContext::Competitor,
        }
    }

    #[must_use]
    pub fn review(url: String, source_type: ReviewSourceType, business_name: String) -> Self {
        Self {
            url,
            context: TargetContext::Review {
                source_type,
                business_name,
            },
        }
    }

    /// Whether a block signature on this target aborts the whole run.
    ///
    /// Only search-engine targets are block-sensitive: a blocked SERP means
    /// every sibling query is burned, while a blocked competitor or review
    /// page is an ordinary per-target failure.
    #[must_use]
    pub fn block_sensitive(&self) -> bool {
        matches!(self.context, TargetContext::Serp { .. })
    }
}
