//! Link extraction for listing pages

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use super::locator::Css;

/// Absolute URLs of every `href` under `selector`, in document order.
///
/// Empty, fragment-only, `javascript:`, `mailto:` and `tel:` links are skipped,
/// as is anything that does not resolve to http(s). Repeats keep their first
/// position.
pub fn extract_links(document: &Html, selector: &Css, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(selector.selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(absolute) = base.join(href) else {
            continue;
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }
        if seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    links
}
