//! Listing scan: turn catalog markup into article summaries.
//!
//! Works on markup from either page source. The entry-count requirement is
//! enforced here so the static backend, which cannot wait on the DOM, still
//! fails the same way the browser backend does when a category has fewer
//! reviews than requested.

use crate::dom;
use crate::error::BridgeError;
use crate::models::{ArticleSummary, BASE_URI};
use once_cell::sync::Lazy;
use scraper::Selector;
use tracing::debug;
use url::Url;

static ENTRY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div[class*='reviews'] div.filter_shoes li[class*='product_list']").unwrap()
});
static HEADING_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.product-info div[class*='product-name'] > a").unwrap());
static TITLE_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static FAVICON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="shortcut icon"]"#).unwrap());

/// Scanned listing: summaries in page order plus the favicon side output.
#[derive(Debug, Clone)]
pub struct Listing {
    pub summaries: Vec<ArticleSummary>,
    pub icon: Option<String>,
}

/// Resolve a listing href against the site base.
fn absolutize(href: &str) -> Result<String, BridgeError> {
    static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URI).unwrap());
    BASE.join(href)
        .map(|u| u.to_string())
        .map_err(|e| BridgeError::Extraction(format!("unresolvable listing href {href:?}: {e}")))
}

/// Extract the first `limit` article summaries from listing markup.
///
/// Fewer than `limit` entries is a fatal navigation error; there is no
/// partial result path out of the listing scan.
pub fn extract_listing(html: &str, limit: usize) -> Result<Listing, BridgeError> {
    dom::with_document(html, |root| {
        let icon = dom::find_one(root, &FAVICON)
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| absolutize(href).ok());

        let entries = dom::find_all(root, &ENTRY);
        if entries.len() < limit {
            return Err(BridgeError::Navigation(format!(
                "listing has {} entries, {} requested",
                entries.len(),
                limit
            )));
        }

        let mut summaries = Vec::with_capacity(limit);
        for entry in entries.into_iter().take(limit) {
            let anchor = dom::require_one(entry, &HEADING_ANCHOR, "listing heading anchor")?;
            let title = dom::text_of(dom::require_one(anchor, &TITLE_SPAN, "listing title")?);
            if title.is_empty() {
                return Err(BridgeError::Extraction("listing entry with empty title".into()));
            }
            let href = dom::require_attr(anchor, "href", "listing heading anchor")?;
            let summary = ArticleSummary::new(title, absolutize(&href)?);
            debug!(title = %summary.title, uri = %summary.uri, "scanned listing entry");
            summaries.push(summary);
        }

        Ok(Listing { summaries, icon })
    })
}

/// Catalog listing markup with `count` product entries, shaped like the
/// live site.
#[cfg(test)]
pub(crate) fn sample_listing_html(count: usize) -> String {
    let mut entries = String::new();
    for i in 1..=count {
        entries.push_str(&format!(
            r#"<li class="product_list product_list-row">
                 <div class="product-info">
                   <div class="product-name clamp-lines">
                     <a href="/shoe-{i}-review"><span>Test Shoe {i}</span></a>
                   </div>
                 </div>
               </li>"#
        ));
    }
    format!(
        r#"<html><head>
             <link rel="shortcut icon" href="/favicon.ico">
           </head><body>
             <div class="reviews catalog">
               <div class="filter_shoes"><ul>{entries}</ul></div>
             </div>
           </body></html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sha256_hex;

    #[test]
    fn test_extracts_limit_summaries_in_order() {
        let listing = extract_listing(&sample_listing_html(5), 3).unwrap();
        assert_eq!(listing.summaries.len(), 3);
        for (i, summary) in listing.summaries.iter().enumerate() {
            let n = i + 1;
            assert_eq!(summary.title, format!("Test Shoe {n}"));
            assert_eq!(summary.uri, format!("https://runrepeat.com/shoe-{n}-review"));
            assert_eq!(summary.uid, sha256_hex(&summary.title));
        }
    }

    #[test]
    fn test_uris_are_absolute_under_base() {
        let listing = extract_listing(&sample_listing_html(2), 2).unwrap();
        assert!(listing.summaries.iter().all(|s| s.uri.starts_with(BASE_URI)));
    }

    #[test]
    fn test_favicon_is_captured() {
        let listing = extract_listing(&sample_listing_html(1), 1).unwrap();
        assert_eq!(listing.icon.as_deref(), Some("https://runrepeat.com/favicon.ico"));
    }

    #[test]
    fn test_short_listing_is_fatal() {
        let err = extract_listing(&sample_listing_html(2), 5).unwrap_err();
        assert!(matches!(err, BridgeError::Navigation(_)));
        assert!(err.to_string().contains("2 entries"));
    }

    #[test]
    fn test_missing_favicon_is_not_fatal() {
        let html = sample_listing_html(1).replace(r#"<link rel="shortcut icon" href="/favicon.ico">"#, "");
        let listing = extract_listing(&html, 1).unwrap();
        assert!(listing.icon.is_none());
    }

    #[test]
    fn test_entry_without_anchor_is_extraction_error() {
        let html = sample_listing_html(1).replace("<a href=", "<b data-href=");
        let err = extract_listing(&html, 1).unwrap_err();
        assert!(matches!(err, BridgeError::Extraction(_)));
    }
}
