//! scoutscrape — browser-driven market intelligence crawling.
//!
//! Three synchronous operations over a shared crawl core: search-result
//! extraction ([`run_serp_crawl`]), competitor content monitoring with
//! snapshot diffing ([`run_competitor_crawl`]), and multi-platform review
//! aggregation ([`run_review_crawl`]). The core schedules page visits under
//! per-kind politeness constraints, extracts structured records from
//! variable-shaped HTML through tiered selector strategies, and maintains
//! point-in-time snapshots for change detection across runs.
//!
//! Partial success is the default: a target that keeps failing is retried,
//! then dropped with a warning. Only invalid input, a broken browser
//! capability, or an explicit anti-bot block on a search target fail the
//! whole operation.

pub mod browser;
pub mod config;
pub mod crawl_engine;
pub mod crawls;
pub mod error;
pub mod extract;
pub mod snapshot;

pub use browser::{CdpBrowser, PageFactory, PageSession, ProxyPool};
pub use config::{
    CompetitorRequest, CrawlKind, ReviewRequest, ReviewSource, ReviewSourceType, SerpRequest,
};
pub use crawl_engine::{
    BlockDetector, PolitenessProfile, RetryPolicy, Target, TargetContext, TargetHandler,
    run_targets,
};
pub use crawls::{
    CompetitorResult, run_competitor_crawl, run_review_crawl, run_serp_crawl,
};
pub use error::{CrawlError, CrawlResult};
pub use extract::{ReviewAggregate, ReviewRecord, SearchResultRecord};
pub use snapshot::{ChangeRecord, PageSnapshot, SnapshotStore, diff, hash_content, url_key};
