//! Descending listing pages level by level
//!
//! Each level turns one page into the URLs of its children. A collapsing
//! level that finds no children hands the page itself to the next level, so
//! subtrees with and without optional intermediate levels walk alike.

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;
use crate::extractors::{extract_links, Css};
use crate::source::{DocumentSource, Page};

/// One traversal step of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub name: String,
    /// Anchors leading to the children of a page at this level.
    pub links: Css,
    /// Pass the page through when it has no children.
    #[serde(default)]
    pub collapse: bool,
}

impl HierarchyLevel {
    pub fn new(name: &str, links: Css) -> Self {
        Self {
            name: name.to_string(),
            links,
            collapse: false,
        }
    }

    pub fn collapsing(mut self) -> Self {
        self.collapse = true;
        self
    }
}

/// Children of `page` at `level`, in document order.
pub fn child_links(document: &Html, page: &Url, level: &HierarchyLevel) -> Vec<Url> {
    let links = extract_links(document, &level.links, page);
    if links.is_empty() && level.collapse {
        vec![page.clone()]
    } else {
        links
    }
}

/// Fetches listing pages and applies [`child_links`].
pub struct Walker<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: DocumentSource + ?Sized> Walker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn children(&self, url: &Url, level: &HierarchyLevel) -> Result<Vec<Url>, FetchError> {
        let page = self.source.fetch(url).await?;
        let children = links_on_page(&page, level);
        tracing::debug!(
            url = %url,
            served_from = %page.url,
            level = %level.name,
            selector = level.links.as_str(),
            children = children.len(),
            "expanded listing page"
        );
        Ok(children)
    }
}

// Parses and drops the document before any await, keeping callers `Send`.
// Links resolve against the URL the page was served from, after redirects.
fn links_on_page(page: &Page, level: &HierarchyLevel) -> Vec<Url> {
    child_links(&page.parse(), &page.url, level)
}
