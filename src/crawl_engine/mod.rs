//! Crawl orchestration core.
//!
//! Drives lists of targets through navigate → settle → consent dismissal →
//! politeness delay → extraction, under per-kind concurrency caps and an
//! explicit retry policy. Single-flight per target; partial success is the
//! default outcome.

pub mod consent;
pub mod orchestrator;
pub mod politeness;
pub mod retry;
pub mod target;

pub use consent::dismiss_consent;
pub use orchestrator::{BlockDetector, OrchestratorContext, TargetHandler, run_targets};
pub use politeness::PolitenessProfile;
pub use retry::{FailureKind, RetryPolicy};
pub use target::{Target, TargetContext};
