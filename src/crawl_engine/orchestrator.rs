//! Target scheduling, retry, and result aggregation.
//!
//! Each target is processed end-to-end by one worker: fresh hardened page,
//! navigate, settle, consent dismissal, politeness delay, extraction. A
//! failing target is retried from scratch on a new page (stealth injection
//! state does not survive a broken navigation), then dropped; partial
//! success is the default outcome. The one exception is an explicit block
//! signature on a block-sensitive target, which aborts the whole run.

use anyhow::Result;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::politeness::PolitenessProfile;
use super::retry::{FailureKind, RetryPolicy};
use super::target::Target;
use crate::browser::{PageFactory, PageSession};
use crate::crawl_engine::consent;
use crate::error::{BlockedPage, CrawlError, CrawlResult};

/// Bound on the post-navigation settle wait
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pluggable anti-bot page predicate.
///
/// The known signature set is a heuristic that will drift as anti-bot pages
/// change shape, so it is data, not code: operators can extend the pattern
/// list without touching the orchestrator.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    patterns: Vec<String>,
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self {
            patterns: vec!["/sorry/".to_string(), "captcha".to_string()],
        }
    }
}

impl BlockDetector {
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Whether `url` matches a known blocked-page signature
    #[must_use]
    pub fn is_blocked(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

/// Per-kind extraction logic invoked once the page is ready.
///
/// Implementations are pure transforms of the already-loaded page: no
/// navigation, no pacing — the orchestrator owns both.
#[allow(async_fn_in_trait)]
pub trait TargetHandler<P: PageSession> {
    type Record;

    async fn extract(&self, page: &P, target: &Target) -> Result<Self::Record>;
}

/// Shared state for one orchestrated run
pub struct OrchestratorContext<'a, F> {
    pub factory: &'a F,
    pub profile: &'a PolitenessProfile,
    pub retry: RetryPolicy,
    pub block_detector: &'a BlockDetector,
}

/// Drive every target through the handler, respecting politeness limits.
///
/// Returns records in completion order — with concurrency above one the
/// relative order of targets is a race, and callers needing stable output
/// must sort by the record's own key afterwards.
pub async fn run_targets<F, H>(
    ctx: &OrchestratorContext<'_, F>,
    targets: Vec<Target>,
    handler: &H,
) -> CrawlResult<Vec<H::Record>>
where
    F: PageFactory,
    H: TargetHandler<F::Page>,
{
    let total = targets.len();
    let concurrency = ctx.profile.max_concurrency.max(1);
    info!("Crawling {total} target(s) with concurrency {concurrency}");

    let mut stream = futures::stream::iter(targets)
        .map(|target| process_target(ctx, handler, target))
        .buffer_unordered(concurrency);

    let mut records = Vec::new();
    while let Some(outcome) = stream.next().await {
        match outcome {
            Ok(Some(record)) => records.push(record),
            // Dropped after exhausting retries; already logged
            Ok(None) => {}
            // Block signal on a block-sensitive target: abort the run.
            // Dropping the stream cancels in-flight siblings at their next
            // suspension point.
            Err(e) => return Err(e),
        }
    }

    info!("Crawl finished: {}/{} target(s) yielded records", records.len(), total);
    Ok(records)
}

/// Retry loop for one target; `Ok(None)` means dropped
async fn process_target<F, H>(
    ctx: &OrchestratorContext<'_, F>,
    handler: &H,
    target: Target,
) -> CrawlResult<Option<H::Record>>
where
    F: PageFactory,
    H: TargetHandler<F::Page>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = tokio::time::timeout(
            ctx.profile.request_timeout,
            attempt_target(ctx, handler, &target),
        )
        .await
        .unwrap_or_else(|_| {
            Err(anyhow::anyhow!(
                "target attempt timed out after {:?}",
                ctx.profile.request_timeout
            ))
        });

        let error = match outcome {
            Ok(record) => return Ok(Some(record)),
            Err(error) => error,
        };

        let kind = FailureKind::classify(&error);

        if kind == FailureKind::Blocked {
            if target.block_sensitive() {
                warn!("Block signal on {} — aborting run", target.url);
                return Err(CrawlError::TargetBlocked {
                    url: target.url.clone(),
                });
            }
            warn!("Block signal on {} — dropping target", target.url);
            return Ok(None);
        }

        if !kind.is_retryable() || attempt >= ctx.retry.max_retries {
            warn!(
                "Dropping {} after {} attempt(s): {error:#}",
                target.url,
                attempt + 1
            );
            return Ok(None);
        }

        let delay = ctx.retry.backoff_delay(attempt);
        debug!(
            "Attempt {}/{} for {} failed ({kind:?}), retrying in {delay:?}: {error:#}",
            attempt + 1,
            ctx.retry.max_retries + 1,
            target.url
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// One full attempt on a fresh page
async fn attempt_target<F, H>(
    ctx: &OrchestratorContext<'_, F>,
    handler: &H,
    target: &Target,
) -> Result<H::Record>
where
    F: PageFactory,
    H: TargetHandler<F::Page>,
{
    let page = ctx.factory.open_page().await?;
    let result = drive_page(ctx, handler, &page, target).await;
    page.close().await;
    result
}

async fn drive_page<F, H>(
    ctx: &OrchestratorContext<'_, F>,
    handler: &H,
    page: &F::Page,
    target: &Target,
) -> Result<H::Record>
where
    F: PageFactory,
    H: TargetHandler<F::Page>,
{
    page.navigate(&target.url).await?;

    // Settle timeout is tolerated: proceed with whatever loaded
    if let Err(e) = page.wait_for_network_idle(SETTLE_TIMEOUT).await {
        warn!("Settle wait failed for {}: {e:#}", target.url);
    }

    // A redirect to an anti-bot page is detectable before extraction
    if let Some(current) = page.current_url().await
        && ctx.block_detector.is_blocked(&current)
    {
        return Err(BlockedPage(current).into());
    }

    if consent::dismiss_consent(page).await {
        debug!("Consent interstitial dismissed on {}", target.url);
    }

    let delay = ctx.profile.jittered_delay();
    debug!("Politeness delay {delay:?} before extracting {}", target.url);
    tokio::time::sleep(delay).await;

    handler.extract(page, target).await
}
