//! Page sources: where listing and detail markup comes from.
//!
//! The collector depends only on the [`PageSource`] trait. Two backends
//! implement it:
//!
//! - [`browser::BrowserSource`] drives a headless Chrome session through the
//!   site's cookie banner and sort control before reading the page (cargo
//!   feature `browser`).
//! - [`fetch::FetchSource`] issues plain HTTP GETs and leaves sort order to
//!   the request URL.
//!
//! Both return raw markup strings; all parsing happens in the extractors so
//! the two backends stay interchangeable.

#[cfg(feature = "browser")]
pub mod browser;
pub mod fetch;

use crate::error::BridgeError;
use crate::models::ShoeType;
use async_trait::async_trait;

/// Supplier of page markup for the collector.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Markup of the catalog listing for `shoe_type`, sorted newest first,
    /// with at least `min_entries` product entries present.
    ///
    /// Backends that render the page interactively must have dismissed the
    /// consent modal and applied the sort before returning.
    async fn listing_html(
        &self,
        shoe_type: ShoeType,
        min_entries: usize,
    ) -> Result<String, BridgeError>;

    /// Markup of a single detail page, with the main content container
    /// present.
    async fn detail_html(&self, uri: &str) -> Result<String, BridgeError>;

    /// Release the underlying resource. Callers log failures and move on;
    /// a failed release never masks an earlier error.
    async fn close(&self) -> Result<(), BridgeError>;
}

/// Linear phase list for preparing the listing page.
///
/// Each transition is one bounded wait-then-act step; a phase that never
/// completes within its timeout is a fatal navigation error for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPhase {
    /// Waiting for the cookie-consent modal to become visible.
    AwaitingConsent,
    /// Consent accepted; waiting for the modal to disappear.
    ConsentDismissed,
    /// Waiting for the sort control, then selecting "newest".
    AwaitingSort,
    /// Sort selected; waiting for the options list to close, then settling.
    SortApplied,
    /// Waiting for the requested number of product entries.
    AwaitingListing,
    /// Listing is ready to read.
    ListingReady,
}

impl ListingPhase {
    /// The phase that follows this one, or `None` once the listing is ready.
    pub fn next(self) -> Option<ListingPhase> {
        match self {
            ListingPhase::AwaitingConsent => Some(ListingPhase::ConsentDismissed),
            ListingPhase::ConsentDismissed => Some(ListingPhase::AwaitingSort),
            ListingPhase::AwaitingSort => Some(ListingPhase::SortApplied),
            ListingPhase::SortApplied => Some(ListingPhase::AwaitingListing),
            ListingPhase::AwaitingListing => Some(ListingPhase::ListingReady),
            ListingPhase::ListingReady => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_sequence_is_linear_and_terminates() {
        let mut phase = ListingPhase::AwaitingConsent;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                ListingPhase::AwaitingConsent,
                ListingPhase::ConsentDismissed,
                ListingPhase::AwaitingSort,
                ListingPhase::SortApplied,
                ListingPhase::AwaitingListing,
                ListingPhase::ListingReady,
            ]
        );
    }
}
