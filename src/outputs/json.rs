//! JSON Feed 1.1 output.
//!
//! See <https://www.jsonfeed.org/version/1.1/>. The `content_html` of each
//! item is the assembled review fragment, embedded as-is.

use crate::models::{Collection, ShoeType};
use serde::Serialize;
use std::error::Error;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: String,
    home_page_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    items: Vec<JsonFeedItem<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFeedItem<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    content_html: &'a str,
    date_published: String,
    authors: Vec<JsonFeedAuthor<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFeedAuthor<'a> {
    name: &'a str,
}

/// Render a collection as a JSON Feed document.
pub fn render_feed(collection: &Collection, shoe_type: ShoeType) -> Result<String, Box<dyn Error>> {
    let feed = JsonFeed {
        version: "https://jsonfeed.org/version/1.1",
        title: format!("RunRepeat – {}", shoe_type.display_name()),
        home_page_url: shoe_type.catalog_url(),
        icon: collection.icon.as_deref(),
        items: collection
            .items
            .iter()
            .map(|item| JsonFeedItem {
                id: &item.uid,
                url: &item.uri,
                title: &item.title,
                content_html: &item.content,
                date_published: item.published_at.to_rfc3339(),
                authors: vec![JsonFeedAuthor { name: &item.author }],
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&feed)?)
}

/// Write the JSON Feed document to `path`.
#[instrument(level = "info", skip(collection))]
pub async fn write_feed(
    collection: &Collection,
    shoe_type: ShoeType,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let feed = render_feed(collection, shoe_type)?;
    tokio::fs::write(path, feed).await?;
    info!(%path, items = collection.items.len(), "wrote JSON feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleItem;
    use chrono::{TimeZone, Utc};

    fn sample_collection() -> Collection {
        Collection {
            items: vec![ArticleItem {
                title: "Test Shoe".to_string(),
                uri: "https://runrepeat.com/test-shoe-review".to_string(),
                uid: crate::utils::sha256_hex("Test Shoe"),
                author: "Jane Doe".to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 3, 1, 13, 37, 0).unwrap(),
                content: "<p>intro</p>".to_string(),
            }],
            icon: Some("https://runrepeat.com/favicon.ico".to_string()),
        }
    }

    #[test]
    fn test_render_feed_shape() {
        let rendered = render_feed(&sample_collection(), ShoeType::RunningShoes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["version"], "https://jsonfeed.org/version/1.1");
        assert_eq!(value["title"], "RunRepeat – Running Shoes");
        assert_eq!(value["home_page_url"], "https://runrepeat.com/catalog/running-shoes");
        assert_eq!(value["icon"], "https://runrepeat.com/favicon.ico");

        let items = value["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["date_published"], "2024-03-01T13:37:00+00:00");
        assert_eq!(items[0]["authors"][0]["name"], "Jane Doe");
    }

    #[test]
    fn test_missing_icon_is_omitted() {
        let mut collection = sample_collection();
        collection.icon = None;
        let rendered = render_feed(&collection, ShoeType::RunningShoes).unwrap();
        assert!(!rendered.contains("\"icon\""));
    }
}
