//! Review adapter behavior: candidate skipping, caps, platform quirks.

mod common;

use common::{FakePage, PageScript};
use scoutscrape::config::ReviewSourceType;
use scoutscrape::extract::review::extract_reviews;
use serde_json::json;

#[tokio::test]
async fn g2_candidate_without_review_body_is_skipped() {
    // Three review cards, one missing its body
    let page = FakePage::loaded(PageScript {
        eval_results: vec![json!([
            {"reviewer": "Dana", "rating_raw": "5", "text": "Great tool.", "date_raw": "2026-05-01"},
            {"reviewer": "Kim", "rating_raw": "4", "text": null, "date_raw": "2026-05-02"},
            {"reviewer": "Ravi", "rating_raw": "4.0", "text": "Solid, some rough edges.", "date_raw": null},
        ])],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::G2, "Acme", 20)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].reviewer_name, "Dana");
    assert_eq!(records[1].reviewer_name, "Ravi");
    assert!(records.iter().all(|r| r.business_name == "Acme"));
}

#[tokio::test]
async fn unparsable_rating_skips_the_candidate() {
    let page = FakePage::loaded(PageScript {
        eval_results: vec![json!([
            {"reviewer": "A", "rating_raw": "no stars shown", "text": "fine", "date_raw": null},
            {"reviewer": "B", "rating_raw": "Rated 3.5 out of 5 stars", "text": "okay", "date_raw": null},
        ])],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::Trustpilot, "Acme", 20)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reviewer_name, "B");
    assert_eq!(records[0].rating, 3.5);
}

#[tokio::test]
async fn output_is_capped_at_max_reviews() {
    let candidates: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            json!({
                "reviewer": format!("Reviewer {i}"),
                "rating_raw": "5",
                "text": format!("Review number {i}"),
                "date_raw": null
            })
        })
        .collect();
    let page = FakePage::loaded(PageScript {
        eval_results: vec![serde_json::Value::Array(candidates)],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::Trustpilot, "Acme", 3)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].reviewer_name, "Reviewer 0");
}

#[tokio::test]
async fn iso_dates_are_kept_and_relative_dates_dropped() {
    let page = FakePage::loaded(PageScript {
        eval_results: vec![json!([
            {"reviewer": "A", "rating_raw": "5", "text": "t", "date_raw": "2026-04-12T08:00:00+00:00"},
            {"reviewer": "B", "rating_raw": "4", "text": "t", "date_raw": "2 weeks ago"},
        ])],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::Google, "Acme", 20)
        .await
        .unwrap();

    assert_eq!(records[0].review_date, "2026-04-12T08:00:00+00:00");
    assert_eq!(records[1].review_date, "");
}

#[tokio::test]
async fn google_source_probes_the_more_reviews_expander() {
    let page = FakePage::loaded(PageScript::default());

    extract_reviews(&page, ReviewSourceType::Google, "Acme", 20)
        .await
        .unwrap();

    let clicks = page.clicks.lock().unwrap();
    assert!(
        clicks.iter().any(|s| s.contains("moreReviews")),
        "google extraction must try the expander before collecting"
    );
}

#[tokio::test]
async fn non_google_sources_do_not_probe_the_expander() {
    let page = FakePage::loaded(PageScript::default());

    extract_reviews(&page, ReviewSourceType::Trustpilot, "Acme", 20)
        .await
        .unwrap();

    assert!(page.clicks.lock().unwrap().is_empty());
}

#[tokio::test]
async fn falls_through_to_broader_tier_when_first_matches_nothing() {
    let page = FakePage::loaded(PageScript {
        eval_results: vec![
            json!([]),
            json!([{"reviewer": "A", "rating_raw": "5", "text": "via tier 2", "date_raw": null}]),
        ],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::G2, "Acme", 20)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].review_text, "via tier 2");
}

#[tokio::test]
async fn no_tier_match_yields_empty_set_not_an_error() {
    let page = FakePage::loaded(PageScript::default());

    let records = extract_reviews(&page, ReviewSourceType::Trustpilot, "Acme", 20)
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn missing_reviewer_name_defaults_to_empty() {
    let page = FakePage::loaded(PageScript {
        eval_results: vec![json!([
            {"reviewer": null, "rating_raw": "4", "text": "anonymous but valid", "date_raw": null},
        ])],
        ..PageScript::default()
    });

    let records = extract_reviews(&page, ReviewSourceType::G2, "Acme", 20)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reviewer_name, "");
}
