//! Thin query helpers over `scraper` documents.
//!
//! Both page-source backends hand the extractors plain markup; everything
//! downstream works on a parsed [`Html`] through these helpers, so the
//! extraction code never knows whether a live browser or a static fetch
//! produced the page.

use crate::error::BridgeError;
use scraper::{ElementRef, Html, Selector};

/// First element under `scope` matching `selector`, if any.
///
/// Like the underlying `select`, this searches descendants only, never
/// `scope` itself.
pub fn find_one<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// All elements under `scope` matching `selector`, in document order.
pub fn find_all<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    scope.select(selector).collect()
}

/// First matching element, or an extraction error naming the missing piece.
pub fn require_one<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    what: &str,
) -> Result<ElementRef<'a>, BridgeError> {
    find_one(scope, selector)
        .ok_or_else(|| BridgeError::Extraction(format!("missing {what} on page")))
}

/// Required attribute value, or an extraction error naming the element.
pub fn require_attr(el: ElementRef<'_>, name: &str, what: &str) -> Result<String, BridgeError> {
    el.value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| BridgeError::Extraction(format!("{what} has no {name} attribute")))
}

/// Concatenated text content of an element, trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse a full document and run `f` against its root element.
///
/// `Html` is not `Send`, so parsing stays inside a single call frame instead
/// of crossing await points.
pub fn with_document<T>(
    html: &str,
    f: impl FnOnce(ElementRef<'_>) -> Result<T, BridgeError>,
) -> Result<T, BridgeError> {
    let document = Html::parse_document(html);
    f(document.root_element())
}
