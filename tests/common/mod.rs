//! Shared test doubles: a scripted fake page-load capability.
//!
//! `FakeFactory` hands out `FakePage`s driven by `PageScript`s, so
//! orchestrator retry behavior and extraction adapters can be exercised
//! without a browser.

use anyhow::Result;
use scoutscrape::browser::{PageFactory, PageSession};
use scoutscrape::crawl_engine::PolitenessProfile;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behavior of one fake page
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct PageScript {
    /// Fail navigation with this message
    pub navigate_error: Option<String>,
    /// URL reported after navigation (defaults to the navigated URL)
    pub final_url: Option<String>,
    /// Results popped front-first for each non-scroll evaluation;
    /// an empty queue yields an empty array (no tier match)
    pub eval_results: Vec<Value>,
    /// Maximum scrollY the fake page can reach
    pub scroll_limit: i64,
}

#[allow(dead_code)]
pub struct FakePage {
    script: PageScript,
    eval_queue: Mutex<VecDeque<Value>>,
    scroll_pos: Mutex<i64>,
    navigated_url: Mutex<Option<String>>,
    pub clicks: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    #[allow(dead_code)]
    pub fn new(script: PageScript) -> Self {
        let eval_queue = Mutex::new(script.eval_results.iter().cloned().collect());
        Self {
            script,
            eval_queue,
            scroll_pos: Mutex::new(0),
            navigated_url: Mutex::new(None),
            clicks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A page that is already "navigated", for driving adapters directly
    #[allow(dead_code)]
    pub fn loaded(script: PageScript) -> Self {
        let page = Self::new(script);
        *page.navigated_url.lock().unwrap() = Some("https://example.com/".to_string());
        page
    }
}

impl PageSession for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        if let Some(message) = &self.script.navigate_error {
            anyhow::bail!("{message}");
        }
        let final_url = self
            .script
            .final_url
            .clone()
            .unwrap_or_else(|| url.to_string());
        *self.navigated_url.lock().unwrap() = Some(final_url);
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        if script.contains("scrollBy") {
            let mut pos = self.scroll_pos.lock().unwrap();
            *pos = (*pos + 600).min(self.script.scroll_limit);
            return Ok(Value::from(*pos));
        }
        if script.contains("readyState") {
            return Ok(serde_json::json!({
                "readyState": "complete",
                "imagesLoaded": true,
                "bodyExists": true
            }));
        }
        Ok(self
            .eval_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(false)
    }

    async fn current_url(&self) -> Option<String> {
        self.navigated_url.lock().unwrap().clone()
    }

    async fn close(self) {}
}

#[allow(dead_code)]
pub struct FakeFactory {
    scripts: Mutex<VecDeque<PageScript>>,
    template: PageScript,
    pub pages_opened: AtomicUsize,
}

impl FakeFactory {
    /// Every opened page follows the same script
    #[allow(dead_code)]
    pub fn with_template(template: PageScript) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            template,
            pages_opened: AtomicUsize::new(0),
        }
    }

    /// Pages follow `scripts` in open order, then fall back to the default
    /// script (successful navigation, no tier matches)
    #[allow(dead_code)]
    pub fn with_scripts(scripts: Vec<PageScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            template: PageScript::default(),
            pages_opened: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }
}

impl PageFactory for FakeFactory {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage> {
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.template.clone());
        Ok(FakePage::new(script))
    }
}

/// Install a test subscriber honoring `RUST_LOG`; repeated calls are no-ops
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Politeness profile with no pacing, for fast tests
#[allow(dead_code)]
pub fn fast_profile(max_concurrency: usize) -> PolitenessProfile {
    PolitenessProfile {
        max_concurrency,
        request_timeout: Duration::from_secs(5),
        max_retries: 3,
        min_delay_ms: 0,
        max_delay_ms: 0,
    }
}
