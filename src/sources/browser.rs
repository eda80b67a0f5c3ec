//! Live browser page source.
//!
//! Drives a headless Chrome session over CDP. The listing page needs real
//! interaction before it can be read: dismiss the cookie-consent modal,
//! switch the sort dropdown to "newest", then wait for the product list to
//! fill. Those steps run as the linear [`ListingPhase`] sequence, one
//! bounded wait per transition.
//!
//! CDP calls block, so each trait method moves its work onto the tokio
//! blocking pool with an owned handle to the tab.

use crate::error::BridgeError;
use crate::models::ShoeType;
use crate::sources::{ListingPhase, PageSource};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

const CONSENT_MODAL: &str = "div[class*='amc-modal-container']";
const CONSENT_ACCEPT: &str = "div[class*='amc-modal-container'] div[format='primary']";
const SORT_BUTTON: &str = ".product-list-header .list-sorting.hidden-xs button";
const SORT_OPTIONS: &str = ".product-list-header .list-sorting.hidden-xs ul";
const SORT_NEWEST: &str = "li#dropdown-select-option-newest";
const CONTENT_AREA: &str = "div.content-area";

/// Per-transition wait budget.
const WAIT_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause after the sort options close, to let the client-side re-render
/// finish before the list is read. A fixed accommodation, not a retry.
const SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Poll interval while waiting for an element to disappear.
const GONE_POLL: Duration = Duration::from_millis(100);

/// Page source backed by a headless Chrome session.
pub struct BrowserSource {
    // Dropping the browser ends the Chrome process; keep it for the
    // lifetime of the source.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSource {
    /// Launch a headless Chrome and open the tab used for the whole run.
    pub fn launch() -> Result<Self, BridgeError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BridgeError::Session(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| BridgeError::Session(format!("cannot launch browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BridgeError::Session(format!("cannot open tab: {e}")))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

fn nav_err(what: &str, e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Navigation(format!("{what}: {e}"))
}

fn wait_visible(tab: &Tab, selector: &str) -> Result<(), BridgeError> {
    tab.wait_for_element_with_custom_timeout(selector, WAIT_TIMEOUT)
        .map(|_| ())
        .map_err(|e| nav_err(&format!("waiting for {selector}"), e))
}

fn click(tab: &Tab, selector: &str) -> Result<(), BridgeError> {
    let element = tab
        .wait_for_element_with_custom_timeout(selector, WAIT_TIMEOUT)
        .map_err(|e| nav_err(&format!("locating {selector}"), e))?;
    element
        .click()
        .map(|_| ())
        .map_err(|e| nav_err(&format!("clicking {selector}"), e))
}

/// JS probe: true once `selector` matches nothing or only a hidden element.
fn hidden_probe_js(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({selector:?}); \
         return el === null || el.offsetParent === null; }})()"
    )
}

/// Poll until `selector` is detached or hidden, or fail when the budget runs
/// out. The consent modal and the sort options close by hiding, not by
/// leaving the DOM, so a bare presence check would never see them go.
fn wait_gone(tab: &Tab, selector: &str) -> Result<(), BridgeError> {
    let probe = hidden_probe_js(selector);
    let deadline = Instant::now() + WAIT_TIMEOUT;
    loop {
        let gone = tab
            .evaluate(&probe, false)
            .map_err(|e| nav_err(&format!("probing visibility of {selector}"), e))?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if gone {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(BridgeError::Navigation(format!(
                "{selector} still visible after {WAIT_TIMEOUT:?}"
            )));
        }
        std::thread::sleep(GONE_POLL);
    }
}

/// Walk the listing through its phase sequence and return the settled markup.
fn prepare_listing(
    tab: &Tab,
    shoe_type: ShoeType,
    min_entries: usize,
) -> Result<String, BridgeError> {
    let url = shoe_type.catalog_url();
    tab.navigate_to(&url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| nav_err(&format!("opening {url}"), e))?;

    let entry_at_limit = format!(
        "div[class*='reviews'] div.filter_shoes li[class*='product_list']:nth-of-type({min_entries})"
    );

    let mut phase = ListingPhase::AwaitingConsent;
    loop {
        debug!(?phase, "listing phase");
        match phase {
            ListingPhase::AwaitingConsent => {
                wait_visible(tab, CONSENT_MODAL)?;
                click(tab, CONSENT_ACCEPT)?;
            }
            ListingPhase::ConsentDismissed => {
                wait_gone(tab, CONSENT_MODAL)?;
            }
            ListingPhase::AwaitingSort => {
                click(tab, SORT_BUTTON)?;
                wait_visible(tab, SORT_OPTIONS)?;
                click(tab, SORT_NEWEST)?;
            }
            ListingPhase::SortApplied => {
                wait_gone(tab, SORT_OPTIONS)?;
                std::thread::sleep(SETTLE_DELAY);
            }
            ListingPhase::AwaitingListing => {
                wait_visible(tab, &entry_at_limit)?;
            }
            ListingPhase::ListingReady => break,
        }
        phase = match phase.next() {
            Some(next) => next,
            None => break,
        };
    }

    tab.get_content()
        .map_err(|e| BridgeError::Session(format!("reading listing markup: {e}")))
}

#[async_trait]
impl PageSource for BrowserSource {
    #[instrument(level = "debug", skip(self))]
    async fn listing_html(
        &self,
        shoe_type: ShoeType,
        min_entries: usize,
    ) -> Result<String, BridgeError> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || prepare_listing(&tab, shoe_type, min_entries))
            .await
            .map_err(|e| BridgeError::Session(format!("browser task failed: {e}")))?
    }

    #[instrument(level = "debug", skip(self))]
    async fn detail_html(&self, uri: &str) -> Result<String, BridgeError> {
        let tab = Arc::clone(&self.tab);
        let uri = uri.to_string();
        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&uri)
                .and_then(|tab| tab.wait_until_navigated())
                .map_err(|e| nav_err(&format!("opening {uri}"), e))?;
            wait_visible(&tab, CONTENT_AREA)?;
            tab.get_content()
                .map_err(|e| BridgeError::Session(format!("reading detail markup: {e}")))
        })
        .await
        .map_err(|e| BridgeError::Session(format!("browser task failed: {e}")))?
    }

    async fn close(&self) -> Result<(), BridgeError> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            tab.close(true)
                .map(|_| ())
                .map_err(|e| BridgeError::Cleanup(format!("closing browser tab: {e}")))
        })
        .await
        .map_err(|e| BridgeError::Cleanup(format!("browser task failed: {e}")))?
    }
}
