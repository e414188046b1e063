//! Consent/cookie interstitial dismissal.
//!
//! Tries an ordered list of known affirmative-action selectors and clicks
//! the first that matches. Finding none is the common case and is not an
//! error — most pages simply have no interstitial.

use std::time::Duration;
use tracing::debug;

use crate::browser::PageSession;

/// Known affirmative-action selectors, most specific first
const CONSENT_SELECTORS: &[&str] = &[
    // Google "Accept all"
    "button#L2AGLb",
    // OneTrust banner
    "#onetrust-accept-btn-handler",
    // Usercentrics
    "button[data-testid='uc-accept-all-button']",
    // Cookiebot
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
    // Quantcast
    "button[mode='primary']",
    // Generic aria labels
    "button[aria-label='Accept all']",
    "button[aria-label='Agree']",
];

/// Pause after a successful click so the overlay can animate out
const DISMISS_SETTLE: Duration = Duration::from_millis(500);

/// Try to dismiss a consent interstitial.
///
/// Returns true when a banner was found and clicked.
pub async fn dismiss_consent<P: PageSession>(page: &P) -> bool {
    for selector in CONSENT_SELECTORS {
        match page.click(selector).await {
            Ok(true) => {
                debug!("Dismissed consent interstitial via '{selector}'");
                tokio::time::sleep(DISMISS_SETTLE).await;
                return true;
            }
            Ok(false) => {}
            Err(e) => {
                debug!("Consent probe '{selector}' failed: {e}");
            }
        }
    }
    false
}
