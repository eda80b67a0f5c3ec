//! Static HTTP page source.
//!
//! Fetches listing and detail pages with a plain `reqwest` client. No UI
//! dance is possible here: sort order rides on the request URL and the
//! entry-count requirement is checked by the listing extractor instead of a
//! DOM wait.

use crate::error::BridgeError;
use crate::models::ShoeType;
use crate::sources::PageSource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Page source backed by plain HTTP fetches.
pub struct FetchSource {
    client: reqwest::Client,
}

impl FetchSource {
    /// Build a client with a bounded request timeout.
    pub fn new() -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BridgeError::Session(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String, BridgeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::Navigation(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Navigation(format!("GET {url} returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::Navigation(format!("reading body of {url} failed: {e}")))?;
        debug!(
            %url,
            bytes = body.len(),
            preview = %crate::utils::truncate_for_log(&body, 120),
            "fetched page"
        );
        Ok(body)
    }
}

#[async_trait]
impl PageSource for FetchSource {
    #[instrument(level = "debug", skip(self))]
    async fn listing_html(
        &self,
        shoe_type: ShoeType,
        _min_entries: usize,
    ) -> Result<String, BridgeError> {
        // The server honors the same sort the UI dropdown applies.
        let url = format!("{}?sort=newest", shoe_type.catalog_url());
        self.fetch(&url).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn detail_html(&self, uri: &str) -> Result<String, BridgeError> {
        self.fetch(uri).await
    }

    async fn close(&self) -> Result<(), BridgeError> {
        // Nothing to release for a plain HTTP client.
        Ok(())
    }
}
