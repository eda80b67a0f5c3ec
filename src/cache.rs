//! Article cache: the sole mechanism preventing redundant detail-page
//! fetches.
//!
//! Entries are keyed by the article `uid` and carry a one-week TTL fixed at
//! store construction. A cache hit reuses the originally scraped content
//! even if the live page has since changed; absence or expiry triggers a
//! re-fetch, never an error.
//!
//! Two stores are provided:
//! - [`MemoryCache`]: in-process TTL cache backed by `moka`, for embedding
//!   the collector in a long-running host.
//! - [`FileCache`]: a JSON file persisted per write, so the TTL survives
//!   across one-shot CLI runs.

use crate::error::BridgeError;
use crate::models::ArticleItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key-value store for fully extracted articles.
#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// Look up an article by uid. `None` on miss or expiry.
    async fn get(&self, uid: &str) -> Option<ArticleItem>;

    /// Store an article under its uid for the store's TTL.
    async fn set(&self, uid: &str, item: ArticleItem);
}

#[async_trait]
impl ArticleCache for Box<dyn ArticleCache> {
    async fn get(&self, uid: &str) -> Option<ArticleItem> {
        (**self).get(uid).await
    }

    async fn set(&self, uid: &str, item: ArticleItem) {
        (**self).set(uid, item).await
    }
}

/// Memoized fetch: return the cached article for `uid`, or run `compute`,
/// store its result, and return it.
pub async fn get_or_compute<C, F, Fut>(
    cache: &C,
    uid: &str,
    compute: F,
) -> Result<ArticleItem, BridgeError>
where
    C: ArticleCache + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ArticleItem, BridgeError>>,
{
    if let Some(hit) = cache.get(uid).await {
        debug!(%uid, "article cache hit");
        return Ok(hit);
    }
    let item = compute().await?;
    cache.set(uid, item.clone()).await;
    debug!(%uid, "article cached");
    Ok(item)
}

/// In-process TTL cache backed by `moka`.
#[derive(Clone)]
pub struct MemoryCache {
    inner: moka::future::Cache<String, ArticleItem>,
}

impl MemoryCache {
    /// Build a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(1024)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl ArticleCache for MemoryCache {
    async fn get(&self, uid: &str) -> Option<ArticleItem> {
        self.inner.get(uid).await
    }

    async fn set(&self, uid: &str, item: ArticleItem) {
        self.inner.insert(uid.to_string(), item).await;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEntry {
    item: ArticleItem,
    expires_at: DateTime<Utc>,
}

/// File-backed cache: one JSON document holding every live entry.
///
/// Writes persist eagerly; a failed persist is logged and the entry stays
/// usable in memory for the rest of the run.
pub struct FileCache {
    path: PathBuf,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEntry>>,
}

impl FileCache {
    /// Open (or create) the cache file at `path`, dropping expired entries.
    pub async fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self, BridgeError> {
        let path = path.into();
        let mut entries: HashMap<String, CachedEntry> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BridgeError::Session(format!("cache file {} is corrupt: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(BridgeError::Session(format!(
                    "cannot read cache file {}: {e}",
                    path.display()
                )));
            }
        };

        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);
        debug!(path = %path.display(), live = entries.len(), "opened article cache");

        Ok(Self {
            path,
            ttl,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, CachedEntry>) {
        match serde_json::to_vec(entries) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.path, bytes).await {
                    warn!(path = %self.path.display(), error = %e, "failed to persist article cache");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize article cache"),
        }
    }
}

#[async_trait]
impl ArticleCache for FileCache {
    async fn get(&self, uid: &str) -> Option<ArticleItem> {
        let entries = self.entries.lock().await;
        entries
            .get(uid)
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| entry.item.clone())
    }

    async fn set(&self, uid: &str, item: ArticleItem) {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(7));
        let mut entries = self.entries.lock().await;
        entries.insert(uid.to_string(), CachedEntry { item, expires_at });
        self.persist(&entries).await;
    }
}
