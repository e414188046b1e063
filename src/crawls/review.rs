//! Review aggregation driver.

use anyhow::Result;
use tracing::info;

use crate::browser::{CdpBrowser, PageSession};
use crate::config::{CrawlKind, ReviewRequest};
use crate::crawl_engine::{
    BlockDetector, OrchestratorContext, PolitenessProfile, RetryPolicy, Target, TargetContext,
    TargetHandler, run_targets,
};
use crate::error::{CrawlError, CrawlResult};
use crate::extract::review::{self, ReviewAggregate};

/// Extracts and aggregates reviews from one platform page per target
pub struct ReviewHandler {
    pub max_reviews_per_source: usize,
}

impl<P: PageSession> TargetHandler<P> for ReviewHandler {
    type Record = ReviewAggregate;

    async fn extract(&self, page: &P, target: &Target) -> Result<Self::Record> {
        let TargetContext::Review {
            source_type,
            business_name,
        } = &target.context
        else {
            anyhow::bail!("Review handler received a non-review target");
        };
        let reviews = review::extract_reviews(
            page,
            *source_type,
            business_name,
            self.max_reviews_per_source,
        )
        .await?;
        Ok(review::aggregate(*source_type, business_name, reviews))
    }
}

/// Aggregate reviews from each source page.
pub async fn run_review_crawl(request: &ReviewRequest) -> CrawlResult<Vec<ReviewAggregate>> {
    request.validate()?;

    info!(
        "Starting review crawl: {} source(s), max {} review(s) each",
        request.sources.len(),
        request.max_reviews_per_source
    );

    let profile = PolitenessProfile::for_kind(CrawlKind::Review);

    let browser = CdpBrowser::launch(true, None)
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;

    let targets: Vec<Target> = request
        .sources
        .iter()
        .map(|source| {
            Target::review(
                source.url.clone(),
                source.source_type,
                source.business_name.clone(),
            )
        })
        .collect();

    let handler = ReviewHandler {
        max_reviews_per_source: request.max_reviews_per_source,
    };
    let block_detector = BlockDetector::default();

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

    let aggregates = outcome?;
    info!(
        "Review crawl finished: {} aggregate(s), {} review(s) total",
        aggregates.len(),
        aggregates.iter().map(|a| a.total_reviews).sum::<usize>()
    );
    Ok(aggregates)
}
