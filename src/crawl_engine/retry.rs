//! Explicit retry policy and failure classification.
//!
//! Retry behavior is a parameter object consumed by the orchestrator rather
//! than a library default, so it can be exercised in isolation against a
//! fake page-load capability that fails N times then succeeds.

use rand::Rng;
use std::time::Duration;

use crate::error::BlockedPage;

/// Retry parameters for one run
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Base backoff; doubles each attempt
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based): exponential plus up
    /// to one base-delay of jitter so parallel retries don't re-align.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_ms.saturating_mul(1_u64 << attempt.min(10));
        let jitter = rand::rng().random_range(0..self.base_delay_ms.max(1));
        Duration::from_millis(exp + jitter)
    }
}

/// Categorizes target failures for retry decisions.
///
/// Network errors are usually transient; browser errors may recover with
/// backoff; extraction errors are usually permanent; a block signature
/// never recovers within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, DNS, connection refused
    Network,
    /// Browser/page crash, CDP error
    Browser,
    /// Page loaded but extraction could not run
    Extraction,
    /// Explicit anti-bot signature
    Blocked,
    /// Unclassified
    Unknown,
}

impl FailureKind {
    /// Classify an error by its marker type or message patterns
    #[must_use]
    pub fn classify(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<BlockedPage>().is_some() {
            return Self::Blocked;
        }

        let msg = error.to_string().to_lowercase();

        if msg.contains("captcha") || msg.contains("blocked") {
            return Self::Blocked;
        }

        if msg.contains("timeout")
            || msg.contains("timed out")
            || msg.contains("connection refused")
            || msg.contains("connection reset")
            || msg.contains("dns")
            || msg.contains("network")
            || msg.contains("unreachable")
        {
            return Self::Network;
        }

        if msg.contains("browser")
            || msg.contains("page closed")
            || msg.contains("target closed")
            || msg.contains("session")
            || msg.contains("websocket")
            || msg.contains("cdp")
        {
            return Self::Browser;
        }

        if msg.contains("evaluat") || msg.contains("deserialize") || msg.contains("selector") {
            return Self::Extraction;
        }

        Self::Unknown
    }

    /// Whether a failure of this kind is worth another navigation attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network | Self::Browser | Self::Unknown => true,
            Self::Extraction | Self::Blocked => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_network_errors_as_retryable() {
        let err = anyhow::anyhow!("Navigation timeout after 30s");
        let kind = FailureKind::classify(&err);
        assert_eq!(kind, FailureKind::Network);
        assert!(kind.is_retryable());
    }

    #[test]
    fn classify_blocked_page_marker_as_permanent() {
        let err = anyhow::Error::new(BlockedPage("https://example.com/sorry/".to_string()));
        let kind = FailureKind::classify(&err);
        assert_eq!(kind, FailureKind::Blocked);
        assert!(!kind.is_retryable());
    }

    #[test]
    fn unknown_errors_default_to_retryable() {
        let err = anyhow::anyhow!("something odd happened");
        assert!(FailureKind::classify(&err).is_retryable());
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1_000,
        };
        assert!(policy.backoff_delay(0) >= Duration::from_millis(1_000));
        assert!(policy.backoff_delay(2) >= Duration::from_millis(4_000));
        assert!(policy.backoff_delay(2) < Duration::from_millis(5_000));
    }
}
