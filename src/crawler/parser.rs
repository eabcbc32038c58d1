//! HTML link extraction
//!
//! Pulls every `<a href>` out of a page and resolves it against the page URL.
//! Relative links (`../api.html`, `/docs/x`, `page#section`) become absolute;
//! anything that does not resolve to a URL with a host is dropped.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the absolute URLs of all anchors in `html`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, including `rel="nofollow"`
///
/// **Exclude:**
/// - Empty and fragment-only hrefs (`#section`)
/// - Hrefs that resolve to a URL without a host (`mailto:`, `javascript:`,
///   `data:`, `tel:`)
/// - Hrefs that fail to resolve
///
/// Fragments on non-fragment-only hrefs are kept, so `a.html#x` and `a.html`
/// are different URLs. Duplicates collapse.
///
/// # Example
///
/// ```
/// use sumi_audit::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let links = extract_links(&base, r#"<a href="api.html">API</a>"#);
/// assert!(links.contains("https://example.com/docs/api.html"));
/// ```
pub fn extract_links(base_url: &Url, html: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Same as `extract_links`, for a page URL that has not been parsed yet
///
/// Returns an empty set if the page URL itself is not a valid absolute URL.
pub fn extract_links_from(page_url: &str, html: &str) -> HashSet<String> {
    match Url::parse(page_url) {
        Ok(base_url) => extract_links(&base_url, html),
        Err(e) => {
            tracing::debug!("Cannot resolve links against {}: {}", page_url, e);
            HashSet::new()
        }
    }
}

/// Resolves an href against the page URL
///
/// Returns None if the link should be dropped.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;

    if absolute_url.scheme().is_empty() || absolute_url.host_str().is_none() {
        return None;
    }

    Some(absolute_url.to_string())
}
