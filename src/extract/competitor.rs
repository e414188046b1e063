//! Competitor page snapshot capture.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use super::js_scripts;
use crate::browser::PageSession;
use crate::snapshot::{PageSnapshot, hash_content};

/// Leading paragraphs kept in a snapshot
pub const MAX_PARAGRAPHS: usize = 10;

/// Shape returned by the in-page content script
#[derive(Debug, Deserialize)]
struct RawPageContent {
    #[serde(default)]
    h1: Vec<String>,
    #[serde(default)]
    h2: Vec<String>,
    #[serde(default)]
    h3: Vec<String>,
    #[serde(default)]
    paragraphs: Vec<String>,
    #[serde(default)]
    word_count: u64,
    #[serde(default)]
    image_count: u64,
    #[serde(default)]
    internal_link_count: u64,
    #[serde(default)]
    external_link_count: u64,
}

/// Capture a [`PageSnapshot`] of the loaded page.
///
/// Running this twice against an unchanged static page yields snapshots
/// with identical `content_hash`.
pub async fn capture_snapshot<P: PageSession>(page: &P, url: &str) -> Result<PageSnapshot> {
    let script = js_scripts::competitor_content_script(MAX_PARAGRAPHS);
    let value = page
        .evaluate(&script)
        .await
        .context("Content extraction script failed")?;
    let raw: RawPageContent =
        serde_json::from_value(value).context("Unexpected page content shape")?;

    let content_hash = hash_content(&raw.h1, &raw.h2, &raw.h3, &raw.paragraphs);

    Ok(PageSnapshot {
        url: url.to_string(),
        h1: raw.h1,
        h2: raw.h2,
        h3: raw.h3,
        word_count: raw.word_count,
        content_hash,
        paragraphs: raw.paragraphs,
        image_count: raw.image_count,
        internal_link_count: raw.internal_link_count,
        external_link_count: raw.external_link_count,
        captured_at: Utc::now(),
    })
}
