//! Collection orchestrator.
//!
//! One invocation scans the catalog listing for up to `limit` article
//! summaries, then resolves each summary to a full item, preferring the
//! cache over a detail-page fetch. Items come back in listing order (newest
//! first); cache hits keep their originally scraped content even when the
//! live page has changed, which bounds load on the source site.
//!
//! Failure policy: a navigation, session or extraction error aborts the
//! rest of the run with a logged warning, and the caller receives whatever
//! items were already fully collected. The page source is released exactly
//! once on every exit path; release failures are logged, never propagated.

pub mod detail;
pub mod listing;

use crate::cache::{self, ArticleCache};
use crate::error::BridgeError;
use crate::models::{Collection, ShoeType, MAX_QUERY_LIMIT};
use crate::sources::PageSource;
use self::detail::LabSectionPolicy;
use tracing::{info, instrument, warn};

/// Top-level article collector over a page source and a cache.
pub struct Collector<S, C> {
    source: S,
    cache: C,
    policy: LabSectionPolicy,
}

impl<S: PageSource, C: ArticleCache> Collector<S, C> {
    pub fn new(source: S, cache: C, policy: LabSectionPolicy) -> Self {
        Self {
            source,
            cache,
            policy,
        }
    }

    /// Collect up to `limit` articles for `shoe_type`.
    ///
    /// `limit` is clamped to `1..=30`. Never fails: errors end the run
    /// early with a warning and the partial result is returned.
    #[instrument(level = "info", skip(self))]
    pub async fn collect(&self, shoe_type: ShoeType, limit: usize) -> Collection {
        let limit = limit.clamp(1, MAX_QUERY_LIMIT);
        let mut collection = Collection::default();

        match self.run(shoe_type, limit, &mut collection).await {
            Ok(()) => info!(items = collection.items.len(), "collection complete"),
            Err(e) => warn!(
                error = %e,
                collected = collection.items.len(),
                "could not collect articles; returning what was gathered"
            ),
        }

        if let Err(e) = self.source.close().await {
            warn!(error = %e, "could not release page source");
        }

        collection
    }

    async fn run(
        &self,
        shoe_type: ShoeType,
        limit: usize,
        collection: &mut Collection,
    ) -> Result<(), BridgeError> {
        let html = self.source.listing_html(shoe_type, limit).await?;
        let listing = listing::extract_listing(&html, limit)?;
        collection.icon = listing.icon;
        info!(count = listing.summaries.len(), %shoe_type, "listing scanned");

        for summary in listing.summaries {
            let item = cache::get_or_compute(&self.cache, &summary.uid, || async {
                let html = self.source.detail_html(&summary.uri).await?;
                detail::extract_article(&html, &summary, self.policy)
            })
            .await?;
            collection.items.push(item);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::{ARTICLE_CACHE_TTL, BASE_URI};
    use crate::utils::sha256_hex;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Page source serving canned markup while counting collaborator calls.
    struct MockSource {
        entries: usize,
        fail_listing: bool,
        fail_detail_for: Option<String>,
        fail_close: bool,
        detail_calls: Mutex<HashMap<String, usize>>,
        close_calls: AtomicUsize,
    }

    impl MockSource {
        fn with_entries(entries: usize) -> Arc<Self> {
            Arc::new(Self {
                entries,
                fail_listing: false,
                fail_detail_for: None,
                fail_close: false,
                detail_calls: Mutex::new(HashMap::new()),
                close_calls: AtomicUsize::new(0),
            })
        }

        fn detail_calls_for(&self, uri: &str) -> usize {
            *self.detail_calls.lock().unwrap().get(uri).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl PageSource for Arc<MockSource> {
        async fn listing_html(
            &self,
            _shoe_type: ShoeType,
            _min_entries: usize,
        ) -> Result<String, BridgeError> {
            if self.fail_listing {
                return Err(BridgeError::Navigation(
                    "cookie modal never became visible".into(),
                ));
            }
            Ok(listing::sample_listing_html(self.entries))
        }

        async fn detail_html(&self, uri: &str) -> Result<String, BridgeError> {
            *self
                .detail_calls
                .lock()
                .unwrap()
                .entry(uri.to_string())
                .or_insert(0) += 1;
            if self.fail_detail_for.as_deref() == Some(uri) {
                return Err(BridgeError::Extraction("missing pros list".into()));
            }
            Ok(detail::sample_detail_html())
        }

        async fn close(&self) -> Result<(), BridgeError> {
            self.close_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(BridgeError::Cleanup("tab already gone".into()));
            }
            Ok(())
        }
    }

    fn collector(source: Arc<MockSource>) -> Collector<Arc<MockSource>, MemoryCache> {
        Collector::new(
            source,
            MemoryCache::new(ARTICLE_CACHE_TTL),
            LabSectionPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_collects_at_most_limit_items_with_valid_fields() {
        let source = MockSource::with_entries(5);
        let collection = collector(Arc::clone(&source))
            .collect(ShoeType::RunningShoes, 3)
            .await;

        assert_eq!(collection.items.len(), 3);
        for item in &collection.items {
            assert!(!item.title.is_empty());
            assert!(item.uri.starts_with(BASE_URI));
            assert_eq!(item.uid, sha256_hex(&item.title));
        }
        assert_eq!(collection.icon.as_deref(), Some("https://runrepeat.com/favicon.ico"));
        assert_eq!(source.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversized_limit_clamps_to_thirty() {
        let source = MockSource::with_entries(35);
        let at_31 = collector(Arc::clone(&source)).collect(ShoeType::Sneakers, 31).await;
        let at_1000 = collector(Arc::clone(&source)).collect(ShoeType::Sneakers, 1000).await;
        let at_30 = collector(Arc::clone(&source)).collect(ShoeType::Sneakers, 30).await;

        assert_eq!(at_31.items.len(), 30);
        let uids = |c: &Collection| c.items.iter().map(|i| i.uid.clone()).collect::<Vec<_>>();
        assert_eq!(uids(&at_31), uids(&at_30));
        assert_eq!(uids(&at_1000), uids(&at_30));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_detail_fetch() {
        let source = MockSource::with_entries(3);
        let collector = collector(Arc::clone(&source));

        let first = collector.collect(ShoeType::RunningShoes, 3).await;
        let second = collector.collect(ShoeType::RunningShoes, 3).await;

        // one detail fetch per uid across both runs
        for item in &first.items {
            assert_eq!(source.detail_calls_for(&item.uri), 1);
        }
        // cache hits are byte-identical to the first scrape
        assert_eq!(
            first.items.iter().map(|i| &i.content).collect::<Vec<_>>(),
            second.items.iter().map(|i| &i.content).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_listing_failure_yields_empty_collection_and_releases_source() {
        let source = Arc::new(MockSource {
            entries: 3,
            fail_listing: true,
            fail_detail_for: None,
            fail_close: false,
            detail_calls: Mutex::new(HashMap::new()),
            close_calls: AtomicUsize::new(0),
        });

        let collection = collector(Arc::clone(&source)).collect(ShoeType::HikingBoots, 3).await;

        assert!(collection.items.is_empty());
        assert!(collection.icon.is_none());
        assert_eq!(source.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detail_failure_returns_partial_results() {
        let failing_uri = format!("{BASE_URI}/shoe-2-review");
        let source = Arc::new(MockSource {
            entries: 3,
            fail_listing: false,
            fail_detail_for: Some(failing_uri),
            fail_close: false,
            detail_calls: Mutex::new(HashMap::new()),
            close_calls: AtomicUsize::new(0),
        });

        let collection = collector(Arc::clone(&source)).collect(ShoeType::RunningShoes, 3).await;

        // the first article was fully collected before the abort
        assert_eq!(collection.items.len(), 1);
        assert_eq!(collection.items[0].title, "Test Shoe 1");
        assert_eq!(source.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_failure_is_swallowed() {
        let source = Arc::new(MockSource {
            entries: 2,
            fail_listing: false,
            fail_detail_for: None,
            fail_close: true,
            detail_calls: Mutex::new(HashMap::new()),
            close_calls: AtomicUsize::new(0),
        });

        let collection = collector(Arc::clone(&source)).collect(ShoeType::RunningShoes, 2).await;
        assert_eq!(collection.items.len(), 2);
    }
}
