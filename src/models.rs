//! Data models for scraped review articles.
//!
//! Two shapes flow through the collector:
//! - [`ArticleSummary`]: the lightweight record produced by the listing scan,
//!   used as the cache lookup key and as the base of the full item.
//! - [`ArticleItem`]: the summary plus author, publish time and assembled
//!   HTML content. Built once per `uid` (fresh scrape or cache hit) and
//!   treated as immutable afterwards.
//!
//! [`ShoeType`] enumerates the eleven catalog categories the site exposes;
//! its slugs double as CLI values and URL path segments.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Base URI of the source site. All listing hrefs resolve against this.
pub const BASE_URI: &str = "https://runrepeat.com";

/// Default number of articles to collect per run.
pub const DEFAULT_QUERY_LIMIT: usize = 3;

/// Hard upper bound on articles per run. Larger requests clamp silently.
pub const MAX_QUERY_LIMIT: usize = 30;

/// How long a scraped article stays valid in the cache: one week.
pub const ARTICLE_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Lightweight article record extracted from a listing entry.
///
/// `uid` is the sha-256 hex digest of the title, which keeps the cache key
/// stable even when the site reshuffles URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    /// Review title, taken from the heading anchor's link text.
    pub title: String,
    /// Absolute URL of the detail page.
    pub uri: String,
    /// Stable identifier: sha-256 of the title, lowercase hex.
    pub uid: String,
}

impl ArticleSummary {
    /// Build a summary from a title and an absolute detail-page URL.
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        let title = title.into();
        let uid = crate::utils::sha256_hex(&title);
        Self {
            title,
            uri: uri.into(),
            uid,
        }
    }
}

/// A fully extracted review article, ready for feed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleItem {
    /// Review title.
    pub title: String,
    /// Absolute URL of the detail page.
    pub uri: String,
    /// Stable identifier, see [`ArticleSummary::uid`].
    pub uid: String,
    /// Author name from the byline.
    pub author: String,
    /// Publish date at the fixed 13:37 anchor time; the site exposes no true
    /// publish time.
    pub published_at: DateTime<Utc>,
    /// Assembled HTML fragment: feed image, intro, pros/cons, lab sections.
    pub content: String,
}

/// The eleven shoe categories the site's catalog exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ShoeType {
    BasketballShoes,
    CrossCountryShoes,
    HikingBoots,
    HikingSandals,
    HikingShoes,
    #[default]
    RunningShoes,
    Sneakers,
    TennisShoes,
    TrackSpikes,
    TrainingShoes,
    WalkingShoes,
}

impl ShoeType {
    /// URL slug for this category.
    pub fn slug(&self) -> &'static str {
        match self {
            ShoeType::BasketballShoes => "basketball-shoes",
            ShoeType::CrossCountryShoes => "cross-country-shoes",
            ShoeType::HikingBoots => "hiking-boots",
            ShoeType::HikingSandals => "hiking-sandals",
            ShoeType::HikingShoes => "hiking-shoes",
            ShoeType::RunningShoes => "running-shoes",
            ShoeType::Sneakers => "sneakers",
            ShoeType::TennisShoes => "tennis-shoes",
            ShoeType::TrackSpikes => "track-spikes",
            ShoeType::TrainingShoes => "training-shoes",
            ShoeType::WalkingShoes => "walking-shoes",
        }
    }

    /// Absolute catalog listing URL for this category.
    pub fn catalog_url(&self) -> String {
        format!("{}/catalog/{}", BASE_URI, self.slug())
    }

    /// Human-readable category name for feed titles.
    pub fn display_name(&self) -> String {
        self.slug()
            .split('-')
            .map(crate::utils::upcase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ShoeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Result of a collection run: items in listing order (newest first) plus
/// the site favicon URL for feed-level metadata.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Collected articles, at most the (clamped) query limit.
    pub items: Vec<ArticleItem>,
    /// Favicon URL captured from the listing page, when present.
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_summary_uid_is_sha256_of_title() {
        let summary = ArticleSummary::new("Nike Pegasus 41", "https://runrepeat.com/nike-pegasus-41");
        assert_eq!(summary.uid, crate::utils::sha256_hex("Nike Pegasus 41"));
        assert_eq!(summary.uid.len(), 64);
    }

    #[test]
    fn test_same_title_same_uid() {
        let a = ArticleSummary::new("Hoka Clifton 9", "https://runrepeat.com/a");
        let b = ArticleSummary::new("Hoka Clifton 9", "https://runrepeat.com/b");
        assert_eq!(a.uid, b.uid);
    }

    #[test]
    fn test_shoe_type_slugs() {
        assert_eq!(ShoeType::value_variants().len(), 11);
        assert_eq!(ShoeType::RunningShoes.slug(), "running-shoes");
        assert_eq!(ShoeType::TrackSpikes.slug(), "track-spikes");
        assert_eq!(ShoeType::default(), ShoeType::RunningShoes);
    }

    #[test]
    fn test_catalog_url() {
        assert_eq!(
            ShoeType::HikingBoots.catalog_url(),
            "https://runrepeat.com/catalog/hiking-boots"
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(ShoeType::CrossCountryShoes.display_name(), "Cross Country Shoes");
    }

    #[test]
    fn test_item_roundtrips_through_json() {
        let item = ArticleItem {
            title: "Adidas Adizero SL".to_string(),
            uri: "https://runrepeat.com/adidas-adizero-sl".to_string(),
            uid: crate::utils::sha256_hex("Adidas Adizero SL"),
            author: "Jane Doe".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 13, 37, 0).unwrap(),
            content: "<p>intro</p>".to_string(),
        };

        let json = serde_json::to_string(&item).unwrap();
        let back: ArticleItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
