//! Extraction adapters: pure transforms from a loaded page to typed records.
//!
//! Each adapter locates candidate containers via an ordered list of selector
//! strategies (narrowest first, broadest last) and is defensive throughout:
//! a candidate missing a required field is skipped, never fatal, and a page
//! where no tier matches yields an empty record set — a legitimate outcome
//! distinct from a crawl failure.

pub mod competitor;
pub mod js_scripts;
pub mod review;
pub mod serp;

pub use competitor::capture_snapshot;
pub use review::{ReviewAggregate, ReviewRecord, extract_reviews};
pub use serp::{SearchResultRecord, extract_search_results};
