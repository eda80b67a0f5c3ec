//! Detail extraction: turn a review page into a full [`ArticleItem`].
//!
//! The site exposes no machine-readable publish time, so the byline date is
//! anchored to a fixed 13:37 time of day to keep feed timestamps
//! deterministic. Content is assembled in a fixed order: feed image, intro
//! paragraph, pros, cons, then the two "who should (not) buy" lab sections.
//!
//! Any missing expected element is an unrecoverable extraction error for the
//! article; the orchestrator decides what that means for the run.

use crate::dom;
use crate::error::BridgeError;
use crate::models::{ArticleItem, ArticleSummary};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static CONTENT_AREA: Lazy<Selector> = Lazy::new(|| Selector::parse("div.content-area").unwrap());
static AUTHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.author-name").unwrap());
static MAIN_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.top-section-container div.main-image img").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article.shoe-review").unwrap());
static TOP_SECTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.top-section-content").unwrap());
static INTRO: Lazy<Selector> = Lazy::new(|| Selector::parse("section#product-intro > div").unwrap());
static PROS: Lazy<Selector> = Lazy::new(|| Selector::parse("div#the_good ul").unwrap());
static CONS: Lazy<Selector> = Lazy::new(|| Selector::parse("div#the_bad ul").unwrap());
static LAB: Lazy<Selector> = Lazy::new(|| Selector::parse("div.lab-content").unwrap());
static WHO_SHOULD_BUY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#who-should-buy .rr_section_content p, #who-should-buy .rr_section_content ul")
        .unwrap()
});
static WHO_SHOULD_NOT_BUY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "#who-should-not-buy .rr_section_content p, #who-should-not-buy .rr_section_content ul",
    )
    .unwrap()
});
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// The byline separator between author and date.
const BYLINE_SEPARATOR: &str = " on ";

/// Fixed anchor time of day for publish timestamps.
const ANCHOR_HOUR: u32 = 13;
const ANCHOR_MINUTE: u32 = 37;

/// Inclusion rule for elements of the "who should (not) buy" lab sections.
///
/// The two upstream scraping variants disagreed on this predicate; it stays
/// configurable until the product owner settles which one is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LabSectionPolicy {
    /// Keep an element only when it embeds no `<img>`.
    SkipEmbeddedImages,
    /// Keep lists unconditionally; other elements only without images.
    #[default]
    ListsAlways,
}

impl std::fmt::Display for LabSectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LabSectionPolicy::SkipEmbeddedImages => "skip-embedded-images",
            LabSectionPolicy::ListsAlways => "lists-always",
        })
    }
}

impl LabSectionPolicy {
    fn includes(self, el: ElementRef<'_>) -> bool {
        let has_img = el.select(&IMG).next().is_some();
        match self {
            LabSectionPolicy::SkipEmbeddedImages => !has_img,
            LabSectionPolicy::ListsAlways => !has_img || el.value().name() == "ul",
        }
    }
}

/// Split an `"author on date"` byline into author and publish timestamp.
///
/// The date is combined with the 13:37 anchor time in UTC. A byline without
/// the separator signals a page layout change and fails extraction.
pub fn parse_byline(byline: &str) -> Result<(String, DateTime<Utc>), BridgeError> {
    let (author, date_part) = byline.split_once(BYLINE_SEPARATOR).ok_or_else(|| {
        BridgeError::Extraction(format!("byline {byline:?} has no {BYLINE_SEPARATOR:?} separator"))
    })?;

    let date = NaiveDate::parse_from_str(date_part.trim(), "%B %d, %Y").map_err(|e| {
        BridgeError::Extraction(format!("byline date {date_part:?} is unparseable: {e}"))
    })?;
    let time = NaiveTime::from_hms_opt(ANCHOR_HOUR, ANCHOR_MINUTE, 0)
        .ok_or_else(|| BridgeError::Extraction("invalid anchor time".into()))?;

    Ok((author.trim().to_string(), date.and_time(time).and_utc()))
}

/// Extract a full article from detail-page markup.
pub fn extract_article(
    html: &str,
    summary: &ArticleSummary,
    policy: LabSectionPolicy,
) -> Result<ArticleItem, BridgeError> {
    dom::with_document(html, |root| {
        dom::require_one(root, &CONTENT_AREA, "main content container")?;

        let byline = dom::text_of(dom::require_one(root, &AUTHOR, "author byline")?);
        let (author, published_at) = parse_byline(&byline)?;

        let image = dom::require_one(root, &MAIN_IMAGE, "main image")?;
        let src = dom::require_attr(image, "src", "main image")?;
        let alt = image.value().attr("alt").unwrap_or_default();
        let feed_image = format!(r#"<img src="{src}" alt="{alt}">"#);

        let article = dom::require_one(root, &ARTICLE, "review article body")?;
        let top = dom::require_one(article, &TOP_SECTION, "top section content")?;
        let intro = dom::text_of(dom::require_one(top, &INTRO, "product intro")?);
        let pros = dom::require_one(top, &PROS, "pros list")?.html();
        let cons = dom::require_one(top, &CONS, "cons list")?.html();
        let lab = dom::require_one(article, &LAB, "lab content")?;

        let mut content = String::new();
        content.push_str(&format!("<p>{intro}</p>"));
        content.push_str("<h2>Pros</h2>");
        content.push_str(&pros);
        content.push_str("<h2>Cons</h2>");
        content.push_str(&cons);
        content.push_str("<h2>Who should buy</h2>");
        for el in dom::find_all(lab, &WHO_SHOULD_BUY) {
            if policy.includes(el) {
                content.push_str(&el.html());
            }
        }
        content.push_str("<h2>Who should NOT buy</h2>");
        for el in dom::find_all(lab, &WHO_SHOULD_NOT_BUY) {
            if policy.includes(el) {
                content.push_str(&el.html());
            }
        }

        Ok(ArticleItem {
            title: summary.title.clone(),
            uri: summary.uri.clone(),
            uid: summary.uid.clone(),
            author,
            published_at,
            content: format!("{feed_image}{}", crate::utils::strip_newlines(&content)),
        })
    })
}

/// Detail-page markup shaped like the live site, newlines and all.
#[cfg(test)]
pub(crate) fn sample_detail_html() -> String {
    r#"<html><head></head><body>
<div class="content-area">
  <div class="top-section-container">
    <div class="author-name">Jane Doe on March 1, 2024</div>
    <div class="main-image">
      <img src="https://cdn.runrepeat.com/shoe.jpg" alt="Test Shoe">
    </div>
  </div>
  <article class="shoe-review">
    <div class="top-section-content">
      <section id="product-intro"><div>A dependable daily trainer.</div></section>
      <div id="the_good"><ul>
<li>Comfortable ride</li>
<li>Durable outsole</li>
</ul></div>
      <div id="the_bad"><ul>
<li>Heavy</li>
</ul></div>
    </div>
    <div class="lab-content">
      <div id="who-should-buy"><div class="rr_section_content">
        <p>Runners who want one shoe for everything.</p>
        <p>Compare the chart <img src="chart.png"></p>
        <ul><li>Fans of the previous model <img src="inline.png"></li></ul>
      </div></div>
      <div id="who-should-not-buy"><div class="rr_section_content">
        <p>Racers chasing a personal best.</p>
      </div></div>
    </div>
  </article>
</div>
</body></html>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_summary() -> ArticleSummary {
        ArticleSummary::new("Test Shoe", "https://runrepeat.com/test-shoe-review")
    }

    #[test]
    fn test_parse_byline() {
        let (author, published_at) = parse_byline("Jane Doe on March 1, 2024").unwrap();
        assert_eq!(author, "Jane Doe");
        assert_eq!(
            published_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 13, 37, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_byline_without_separator_fails() {
        let err = parse_byline("Jane Doe, March 1, 2024").unwrap_err();
        assert!(matches!(err, BridgeError::Extraction(_)));
    }

    #[test]
    fn test_parse_byline_with_bad_date_fails() {
        assert!(parse_byline("Jane Doe on yesterday").is_err());
    }

    #[test]
    fn test_content_is_assembled_in_fixed_order() {
        let item =
            extract_article(&sample_detail_html(), &sample_summary(), LabSectionPolicy::default())
                .unwrap();

        assert!(item
            .content
            .starts_with(r#"<img src="https://cdn.runrepeat.com/shoe.jpg" alt="Test Shoe">"#));
        assert!(item.content.contains("<p>A dependable daily trainer.</p>"));

        assert_eq!(item.content.matches("<h2>Pros</h2>").count(), 1);
        assert_eq!(item.content.matches("<h2>Cons</h2>").count(), 1);
        assert!(item.content.contains("<h2>Pros</h2><ul>"));
        assert!(item.content.contains("<h2>Cons</h2><ul>"));

        let pros_at = item.content.find("<h2>Pros</h2>").unwrap();
        let cons_at = item.content.find("<h2>Cons</h2>").unwrap();
        let buy_at = item.content.find("<h2>Who should buy</h2>").unwrap();
        let not_buy_at = item.content.find("<h2>Who should NOT buy</h2>").unwrap();
        assert!(pros_at < cons_at && cons_at < buy_at && buy_at < not_buy_at);

        assert!(!item.content.contains('\n'));
        assert_eq!(item.author, "Jane Doe");
        assert_eq!(item.uid, sample_summary().uid);
    }

    #[test]
    fn test_lab_paragraph_with_image_is_excluded() {
        let item =
            extract_article(&sample_detail_html(), &sample_summary(), LabSectionPolicy::default())
                .unwrap();
        assert!(item.content.contains("Runners who want one shoe for everything."));
        assert!(!item.content.contains("Compare the chart"));
        assert!(item.content.contains("Racers chasing a personal best."));
    }

    #[test]
    fn test_lists_always_policy_keeps_list_with_image() {
        let item = extract_article(
            &sample_detail_html(),
            &sample_summary(),
            LabSectionPolicy::ListsAlways,
        )
        .unwrap();
        assert!(item.content.contains("Fans of the previous model"));
    }

    #[test]
    fn test_skip_embedded_images_policy_drops_list_with_image() {
        let item = extract_article(
            &sample_detail_html(),
            &sample_summary(),
            LabSectionPolicy::SkipEmbeddedImages,
        )
        .unwrap();
        assert!(!item.content.contains("Fans of the previous model"));
    }

    #[test]
    fn test_missing_byline_aborts_extraction() {
        let html = sample_detail_html().replace("author-name", "byline");
        let err =
            extract_article(&html, &sample_summary(), LabSectionPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("author byline"));
    }

    #[test]
    fn test_missing_pros_list_aborts_extraction() {
        let html = sample_detail_html().replace("the_good", "the_fine");
        let err =
            extract_article(&html, &sample_summary(), LabSectionPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("pros list"));
    }
}
