//! Error types for crawl operations.
//!
//! Only two conditions fail an entire operation: invalid caller input and
//! a broken browser capability. Everything else degrades to partial results
//! at the orchestrator level, with the exception of an explicit block signal
//! on a search-engine target, which is surfaced as [`CrawlError::TargetBlocked`]
//! so operators can distinguish "page changed" from "we got blocked".

/// Crate-wide error type for crawl operations
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Caller-supplied data failed validation; raised before any navigation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An explicit anti-bot signature was detected on a block-sensitive target
    #[error("Target blocked by anti-bot protection: {url}")]
    TargetBlocked { url: String },

    /// Page navigation failed after exhausting retries
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A bounded wait elapsed without the operation completing
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The browser capability itself is unavailable or broke mid-run
    #[error("Browser error: {0}")]
    Browser(String),

    /// Snapshot store I/O or serialization failure
    #[error("Snapshot store error: {0}")]
    Snapshot(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve the full context chain
        Self::Browser(format!("{err:#}"))
    }
}

/// Convenience alias for Result with [`CrawlError`]
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Marker error raised when a navigation lands on a known anti-bot page.
///
/// Carried inside an `anyhow::Error` so it can cross the capability boundary;
/// the orchestrator downcasts to decide between aborting the run (search
/// targets) and dropping the target (everything else).
#[derive(Debug, thiserror::Error)]
#[error("blocked page detected at {0}")]
pub struct BlockedPage(pub String);
