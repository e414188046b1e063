//! Capability traits for page loading, and their chromiumoxide binding.
//!
//! The orchestrator and the extraction adapters are generic over these
//! traits, so retry and extraction logic is testable against a fake
//! capability that fails N times then succeeds, without a browser anywhere
//! near the test.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::stealth::{self, StealthConfig};

/// One loaded (or loadable) page.
///
/// All operations are fallible and bounded; the evaluation result is an
/// opaque, already-serialized value — callers must never assume the
/// evaluation environment shares process state.
#[allow(async_fn_in_trait)]
pub trait PageSession {
    /// Navigate to `url` and wait for the main document to load
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait up to `timeout` for the page to settle (quiet network, rendered
    /// DOM). Elapsing the timeout is non-fatal: the page is used as-is.
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;

    /// Evaluate a script in the page and return its JSON-serialized result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Click the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matched or the click failed —
    /// absence of a clickable element is an expected outcome, not an error.
    async fn click(&self, selector: &str) -> Result<bool>;

    /// URL the page currently shows, if it has one
    async fn current_url(&self) -> Option<String>;

    /// Release the page
    async fn close(self);
}

/// Source of fresh, hardened pages
#[allow(async_fn_in_trait)]
pub trait PageFactory {
    type Page: PageSession;

    /// Open a new blank page with anti-detection measures already applied
    async fn open_page(&self) -> Result<Self::Page>;
}

// =============================================================================
// chromiumoxide binding
// =============================================================================

/// Default bound on `page.goto` + load-event wait
const NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// A launched browser acting as the production [`PageFactory`]
pub struct CdpBrowser {
    browser: Arc<Browser>,
    handler_task: JoinHandle<()>,
    stealth: StealthConfig,
    user_data_dir: std::path::PathBuf,
}

impl CdpBrowser {
    /// Launch a browser routed through `proxy` (when given) and wrap it
    pub async fn launch(headless: bool, proxy: Option<String>) -> Result<Self> {
        let (browser, handler_task, user_data_dir) =
            super::setup::launch_browser(headless, proxy).await?;
        Ok(Self {
            browser: Arc::new(browser),
            handler_task,
            stealth: StealthConfig::default(),
            user_data_dir,
        })
    }

    /// Close the browser and stop the CDP handler task.
    ///
    /// Order matters: close the browser first so the handler keeps its CDP
    /// connection until the process exits, then abort the handler, then
    /// remove the profile directory.
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {e}");
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed to wait for browser exit: {e}");
                }
            }
            Err(arc) => {
                warn!(
                    "Browser still has {} strong references, skipping graceful close",
                    Arc::strong_count(&arc)
                );
            }
        }

        self.handler_task.abort();
        if let Err(e) = self.handler_task.await
            && !e.is_cancelled()
        {
            warn!("Browser handler task failed during abort: {e}");
        }

        if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
            debug!(
                "Failed to clean up profile directory {}: {e}",
                self.user_data_dir.display()
            );
        }
    }
}

impl PageFactory for CdpBrowser {
    type Page = CdpPage;

    async fn open_page(&self) -> Result<Self::Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create blank page")?;

        // Stealth must land before any navigation so init scripts run ahead
        // of the target page's own scripts.
        stealth::harden_page(&page, &self.stealth)
            .await
            .context("Failed to apply stealth hardening")?;

        Ok(CdpPage { page })
    }
}

/// Production [`PageSession`] over a chromiumoxide [`Page`]
pub struct CdpPage {
    page: Page,
}

impl PageSession for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let timeout = Duration::from_secs(NAVIGATION_TIMEOUT_SECS);

        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| anyhow::anyhow!("Navigation timeout after {NAVIGATION_TIMEOUT_SECS}s"))?
            .with_context(|| format!("Failed to navigate to {url}"))?;

        tokio::time::timeout(timeout, self.page.wait_for_navigation())
            .await
            .map_err(|_| anyhow::anyhow!("Page load timeout after {NAVIGATION_TIMEOUT_SECS}s"))?
            .context("Failed to wait for page load")?;

        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        // page.wait_for_navigation returns when the HTTP response arrives;
        // JS-rendered pages keep mutating afterwards. Poll readyState and
        // image completion, proceeding with whatever loaded on timeout.
        let start = Instant::now();
        let poll_interval = Duration::from_millis(100);

        let ready_state_script = r#"
            (() => {
                return {
                    readyState: document.readyState,
                    imagesLoaded: Array.from(document.images).every(img => img.complete),
                    bodyExists: document.body !== null
                };
            })()
        "#;

        loop {
            if start.elapsed() >= timeout {
                warn!(
                    "Timeout waiting for page to settle after {:.1}s, proceeding anyway",
                    timeout.as_secs_f64()
                );
                return Ok(());
            }

            match self.evaluate(ready_state_script).await {
                Ok(value) => {
                    let ready =
                        value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let body_exists = value
                        .get("bodyExists")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    if ready && body_exists {
                        let images_loaded = value
                            .get("imagesLoaded")
                            .and_then(|v| v.as_bool())
                            .unwrap_or(false);
                        if !images_loaded {
                            tokio::time::sleep(Duration::from_millis(500)).await;
                        }
                        debug!("Page settled after {:.2}s", start.elapsed().as_secs_f64());
                        return Ok(());
                    }
                }
                Err(e) => {
                    debug!("Failed to check readyState: {e}, retrying");
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("Script evaluation failed")?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize evaluation result: {e}"))
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let element = match self.page.find_element(selector).await {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        match element.click().await {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!("Click on '{selector}' failed: {e}");
                Ok(false)
            }
        }
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }

    async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("Failed to close page: {e}");
        }
    }
}
