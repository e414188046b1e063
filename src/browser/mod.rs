//! The page-load capability.
//!
//! The crawl engine never touches chromiumoxide directly: it drives pages
//! through the [`PageSession`] and [`PageFactory`] traits defined in
//! [`session`], which also provides the production CDP binding. [`setup`]
//! finds or downloads a Chrome/Chromium executable and launches it with the
//! hardened flag set; [`stealth`] applies per-page anti-detection measures
//! before any page script runs.

pub mod session;
pub mod setup;
pub mod stealth;

pub use session::{CdpBrowser, CdpPage, PageFactory, PageSession};
pub use setup::{ProxyPool, find_browser_executable, launch_browser};
