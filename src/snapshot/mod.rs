//! Point-in-time page snapshots and change detection.
//!
//! A [`PageSnapshot`] is the stored representation of a competitor page used
//! for cross-run diffing. Two snapshots with the same `content_hash` are
//! defined as content-identical regardless of incidental whitespace or
//! DOM-order noise outside the hashed fields.

pub mod diff;
pub mod store;

pub use diff::{ChangeRecord, INTERNAL_LINK_TOLERANCE, diff};
pub use store::SnapshotStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

/// Extracted representation of one competitor page at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    /// Ordered h1 heading texts
    pub h1: Vec<String>,
    /// Ordered h2 heading texts
    pub h2: Vec<String>,
    /// Ordered h3 heading texts
    pub h3: Vec<String>,
    pub word_count: u64,
    /// Digest over headings + paragraphs; see [`hash_content`]
    pub content_hash: String,
    /// First paragraphs of body text, in document order
    pub paragraphs: Vec<String>,
    pub image_count: u64,
    pub internal_link_count: u64,
    pub external_link_count: u64,
    pub captured_at: DateTime<Utc>,
}

/// Digest the content-bearing fields of a snapshot.
///
/// The hash input is exactly: h1 list, h2 list, h3 list, paragraphs — in
/// that order, each segment terminated by a newline. Any extension to the
/// extracted schema that should affect change detection must be added here
/// explicitly; nothing else feeds the hash.
pub fn hash_content(h1: &[String], h2: &[String], h3: &[String], paragraphs: &[String]) -> String {
    let mut hasher = Xxh3::new();
    for segment in [h1, h2, h3, paragraphs] {
        for text in segment {
            hasher.update(text.as_bytes());
            hasher.update(b"\n");
        }
    }
    hex::encode(hasher.digest().to_be_bytes())
}

/// Stable store key for a target URL.
///
/// Same digest family as [`hash_content`], so repeated runs against a
/// byte-identical URL string always resolve to the same record.
pub fn url_key(url: &str) -> String {
    hex::encode(xxhash_rust::xxh3::xxh3_64(url.as_bytes()).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn hash_is_deterministic() {
        let h1 = texts(&["Pricing"]);
        let h2 = texts(&["Plans", "FAQ"]);
        let paragraphs = texts(&["We offer three plans."]);
        let a = hash_content(&h1, &h2, &[], &paragraphs);
        let b = hash_content(&h1, &h2, &[], &paragraphs);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_depends_on_heading_order() {
        let a = hash_content(&texts(&["One", "Two"]), &[], &[], &[]);
        let b = hash_content(&texts(&["Two", "One"]), &[], &[], &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_distinguishes_segment_boundaries() {
        // "ab" as one h1 vs "a" + "b" as two must not collide
        let a = hash_content(&texts(&["ab"]), &[], &[], &[]);
        let b = hash_content(&texts(&["a", "b"]), &[], &[], &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn url_key_is_stable_and_url_sensitive() {
        let a = url_key("https://example.com/pricing");
        let b = url_key("https://example.com/pricing");
        let c = url_key("https://example.com/pricing?utm=x");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
