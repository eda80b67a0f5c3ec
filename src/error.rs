//! Error taxonomy for a collection run.
//!
//! Errors fall into four classes with distinct propagation rules:
//!
//! - [`BridgeError::Navigation`]: a required page element never appeared or
//!   disappeared within its wait timeout. Aborts the run.
//! - [`BridgeError::Session`]: the underlying browser session became invalid
//!   mid-run (launch failure, lost tab, dead CDP connection). Aborts the run.
//! - [`BridgeError::Extraction`]: an expected content element was absent on a
//!   detail page, indicating a page layout change. Aborts the run.
//! - [`BridgeError::Cleanup`]: releasing the page source failed after the
//!   main work finished. Always logged, never propagated.
//!
//! The orchestrator converts aborts into a warning plus whatever items were
//! already fully collected; a run never panics or raises to the caller.

use thiserror::Error;

/// Error raised while collecting articles from RunRepeat.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required page element never appeared/disappeared within the timeout.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The underlying browser session became invalid.
    #[error("browser session failed: {0}")]
    Session(String),

    /// An expected content element is missing on a detail page.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Releasing the page source failed. Logged by the caller, never propagated.
    #[error("cleanup failed: {0}")]
    Cleanup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_detail() {
        let e = BridgeError::Navigation("cookie modal still present after 30s".into());
        assert_eq!(
            e.to_string(),
            "navigation failed: cookie modal still present after 30s"
        );
    }

    #[test]
    fn test_extraction_error_display() {
        let e = BridgeError::Extraction("no element for selector div.author-name".into());
        assert!(e.to_string().starts_with("extraction failed:"));
    }
}
