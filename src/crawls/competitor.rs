//! Competitor monitoring driver.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::browser::{CdpBrowser, PageSession};
use crate::config::{CompetitorRequest, CrawlKind};
use crate::crawl_engine::{
    BlockDetector, OrchestratorContext, PolitenessProfile, RetryPolicy, Target, TargetHandler,
    run_targets,
};
use crate::error::{CrawlError, CrawlResult};
use crate::extract::competitor::capture_snapshot;
use crate::snapshot::{ChangeRecord, PageSnapshot, SnapshotStore, diff, url_key};

/// Outcome for one monitored URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorResult {
    pub url: String,
    /// Absent on the first-ever visit
    pub previous_snapshot: Option<PageSnapshot>,
    pub current_snapshot: PageSnapshot,
    pub changes: ChangeRecord,
    pub has_changes: bool,
}

/// Captures a snapshot and diffs it against the stored one
pub struct CompetitorHandler<'a> {
    pub store: &'a SnapshotStore,
    /// When false the comparison is read-only: history is not mutated
    pub persist: bool,
}

impl<P: PageSession> TargetHandler<P> for CompetitorHandler<'_> {
    type Record = CompetitorResult;

    async fn extract(&self, page: &P, target: &Target) -> Result<Self::Record> {
        let current = capture_snapshot(page, &target.url).await?;
        let key = url_key(&target.url);

        // Read-then-write under the store lock so two workers on the same
        // URL cannot interleave between the get and the put.
        let previous = {
            let _guard = self.store.lock_for_update().await;
            let previous = self.store.get(&key).await;
            if self.persist {
                self.store
                    .put(&key, &current)
                    .await
                    .map_err(anyhow::Error::new)?;
            }
            previous
        };

        let changes = diff(previous.as_ref(), &current);
        let has_changes = changes.has_changes();

        Ok(CompetitorResult {
            url: target.url.clone(),
            previous_snapshot: previous,
            current_snapshot: current,
            changes,
            has_changes,
        })
    }
}

/// Snapshot each URL, diff against history, and report change records.
pub async fn run_competitor_crawl(
    request: &CompetitorRequest,
) -> CrawlResult<Vec<CompetitorResult>> {
    request.validate()?;

    info!(
        "Starting competitor crawl: {} URL(s), persist_snapshots={}",
        request.urls.len(),
        request.persist_snapshots
    );

    let store = SnapshotStore::open(request.snapshot_dir.clone()).await?;
    let profile = PolitenessProfile::for_kind(CrawlKind::Competitor);

    let browser = CdpBrowser::launch(true, None)
        .await
        .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;

    let targets: Vec<Target> = request
        .urls
        .iter()
        .map(|url| Target::competitor(url.clone()))
        .collect();

    let handler = CompetitorHandler {
        store: &store,
        persist: request.persist_snapshots,
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

    let results = outcome?;
    info!(
        "Competitor crawl finished: {}/{} page(s), {} with changes",
        results.len(),
        request.urls.len(),
        results.iter().filter(|r| r.has_changes).count()
    );
    Ok(results)
}
