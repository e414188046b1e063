//! Change detection between two snapshots of the same page.

use serde::{Deserialize, Serialize};

use super::PageSnapshot;

/// Internal-link count may drift by this much between loads (lazy-loaded
/// widgets, rotating footers) without counting as a structural change.
pub const INTERNAL_LINK_TOLERANCE: i64 = 5;

/// Structured delta between the previous and current snapshot of a page.
///
/// Derived, never persisted; recomputed from the `(previous, current)` pair
/// on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Ordered h1/h2/h3 lists differ in content or order at any level
    pub headings_changed: bool,
    /// Content hashes differ
    pub content_changed: bool,
    /// Signed word count delta (current - previous)
    pub word_count_diff: i64,
    /// Image count differs at all, or internal links drifted beyond tolerance
    pub structure_changed: bool,
}

impl ChangeRecord {
    /// True when any field indicates a change (the numeric field counts
    /// as changed iff non-zero)
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.headings_changed
            || self.content_changed
            || self.word_count_diff != 0
            || self.structure_changed
    }
}

/// Compare a newly captured snapshot against the stored one.
///
/// A first observation is never "changed": with no previous snapshot all
/// flags are false and the delta is zero — the current capture is baseline.
#[must_use]
pub fn diff(previous: Option<&PageSnapshot>, current: &PageSnapshot) -> ChangeRecord {
    let Some(prev) = previous else {
        return ChangeRecord::default();
    };

    let headings_changed = prev.h1 != current.h1 || prev.h2 != current.h2 || prev.h3 != current.h3;
    let content_changed = prev.content_hash != current.content_hash;
    let word_count_diff = current.word_count as i64 - prev.word_count as i64;

    let image_delta = current.image_count as i64 - prev.image_count as i64;
    let internal_link_delta = current.internal_link_count as i64 - prev.internal_link_count as i64;
    let structure_changed = image_delta != 0 || internal_link_delta.abs() > INTERNAL_LINK_TOLERANCE;

    ChangeRecord {
        headings_changed,
        content_changed,
        word_count_diff,
        structure_changed,
    }
}
