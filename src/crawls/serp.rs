//! SERP crawl driver.

use anyhow::Result;
use tracing::info;

use crate::browser::{CdpBrowser, PageSession, ProxyPool};
use crate::config::{CrawlKind, SerpRequest};
use crate::crawl_engine::{
    BlockDetector, OrchestratorContext, PolitenessProfile, RetryPolicy, Target, TargetContext,
    TargetHandler, run_targets,
};
use crate::error::{CrawlError, CrawlResult};
use crate::extract::serp::{self, SearchResultRecord};

/// Extracts ranked results from one search-results page per target
pub struct SerpHandler {
    pub max_results: usize,
    pub block_detector: BlockDetector,
}

impl<P: PageSession> TargetHandler<P> for SerpHandler {
    type Record = Vec<SearchResultRecord>;

    async fn extract(&self, page: &P, target: &Target) -> Result<Self::Record> {
        let TargetContext::Serp { keyword } = &target.context else {
            anyhow::bail!("SERP handler received a non-SERP target");
        };
        serp::extract_search_results(page, keyword, self.max_results, &self.block_detector).await
    }
}

/// Crawl one search-results page per keyword and return ranked records.
///
/// Strictly sequential (see [`PolitenessProfile::for_kind`]); the caller's
/// delay bounds override the profile's. Output is sorted by keyword then
/// position, since completion order carries no guarantee.
pub async fn run_serp_crawl(request: &SerpRequest) -> CrawlResult<Vec<SearchResultRecord>> {
    request.validate()?;

    info!(
        "Starting SERP crawl: {} keyword(s), max {} result(s) each",
        request.keywords.len(),
        request.max_results
    );

    let profile = PolitenessProfile::for_kind(CrawlKind::Serp)
        .with_delay_range(request.min_delay_ms, request.max_delay_ms);
    let proxies = ProxyPool::new(request.proxies.clone());

    let browser = CdpBrowser::launch(true, proxies.next())
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;

    let targets: Vec<Target> = request
        .keywords
        .iter()
        .map(|keyword| Target::serp(serp::search_url(keyword), keyword.clone()))
        .collect();

    let block_detector = BlockDetector::default();
    let handler = SerpHandler {
        max_results: request.max_results,
        block_detector: block_detector.clone(),
    };

    let outcome = {
        let ctx = OrchestratorContext {
            factory: &browser,
            profile: &profile,
            retry: RetryPolicy::new(profile.max_retries),
            block_detector: &block_detector,
        };
        run_targets(&ctx, targets, &handler).await
    };

    browser.shutdown().await;

    let batches = outcome?;
    let mut records: Vec<SearchResultRecord> = batches.into_iter().flatten().collect();
    records.sort_by(|a, b| a.keyword.cmp(&b.keyword).then(a.position.cmp(&b.position)));

    info!("SERP crawl finished with {} record(s)", records.len());
    Ok(records)
}
