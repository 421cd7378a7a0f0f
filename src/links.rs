//! Link discovery on the vendor download page
//!
//! Produces the `href` of every anchor element in document order. No
//! filtering happens here: relative, absolute, and malformed hrefs are all
//! passed through for the selector to judge.

use scraper::{Html, Selector};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ANCHOR_WITH_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is a literal"));

/// Collect the `href` values of all `<a>` elements in `html`, in document order.
///
/// The page is parsed as an HTML document, so quoting style, attribute
/// order, and character entities are handled the way a browser would, and
/// anchors inside comments or `<script>` are not links.
///
/// ```
/// use addon_updater::links::extract_links;
///
/// let html = r#"<p><a href="/downloads/elvui-11.27.zip">Download</a> <a href='/changelog'>Log</a></p>"#;
/// assert_eq!(extract_links(html), vec!["/downloads/elvui-11.27.zip", "/changelog"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_WITH_HREF)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}
