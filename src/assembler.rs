//! Building one attribute record per leaf
//!
//! A leaf contributes fields from a chain of related pages. The first page is
//! the leaf URL itself; every later page's URL is derived from the one before
//! it by swapping a single path segment.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CrawlError, DeriveError};
use crate::extractors::{extract, FieldSpec};
use crate::record::{AttributeRecord, FieldOutcome};
use crate::source::{DocumentSource, Page};

/// Replace every path segment equal to `from` with `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSubstitution {
    pub from: String,
    pub to: String,
}

impl PathSubstitution {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn derive_url(&self, url: &Url) -> Result<Url, DeriveError> {
        let missing = || DeriveError {
            url: url.to_string(),
            segment: self.from.clone(),
        };

        let segments: Vec<&str> = url.path_segments().ok_or_else(missing)?.collect();
        if !segments.iter().any(|s| *s == self.from) {
            return Err(missing());
        }

        let replaced: Vec<&str> = segments
            .into_iter()
            .map(|s| if s == self.from { self.to.as_str() } else { s })
            .collect();

        let mut derived = url.clone();
        derived.set_path(&format!("/{}", replaced.join("/")));
        Ok(derived)
    }
}

/// One page of a leaf and the fields read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub name: String,
    /// How to reach this page from the previous one. `None` on the leaf page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive: Option<PathSubstitution>,
    pub fields: Vec<FieldSpec>,
}

/// URLs of every page contributing to `leaf`, in page order.
pub fn page_urls(leaf: &Url, pages: &[PageSpec]) -> Result<Vec<Url>, DeriveError> {
    let mut urls: Vec<Url> = Vec::with_capacity(pages.len());
    for page in pages {
        let url = match (&page.derive, urls.last()) {
            (Some(rule), Some(previous)) => rule.derive_url(previous)?,
            (Some(rule), None) => rule.derive_url(leaf)?,
            (None, _) => leaf.clone(),
        };
        urls.push(url);
    }
    Ok(urls)
}

/// Run every page's fields against its document. Never fails: a field that
/// does not parse is recorded as malformed and logged.
pub fn assemble_from_pages(leaf: &Url, pages: &[PageSpec], fetched: &[Page]) -> AttributeRecord {
    let mut fields = Vec::new();

    for (spec, page) in pages.iter().zip(fetched) {
        let document = page.parse();
        for field in &spec.fields {
            let outcome = match extract(&document, field) {
                Ok(value) => FieldOutcome::Value(value),
                Err(err) => {
                    tracing::warn!(
                        leaf = %leaf,
                        page = %spec.name,
                        field = %field.name,
                        text = %err.text,
                        error = %err.reason,
                        "malformed field value"
                    );
                    FieldOutcome::Malformed {
                        text: err.text,
                        reason: err.reason,
                    }
                }
            };
            fields.push((field.name.clone(), outcome));
        }
    }

    AttributeRecord::new(leaf.clone(), fields)
}

/// Fetches a leaf's pages and assembles its record.
pub struct Assembler<'a, S: ?Sized> {
    source: &'a S,
    pages: &'a [PageSpec],
}

impl<'a, S: DocumentSource + ?Sized> Assembler<'a, S> {
    pub fn new(source: &'a S, pages: &'a [PageSpec]) -> Self {
        Self { source, pages }
    }

    pub async fn assemble(&self, leaf: &Url) -> Result<AttributeRecord, CrawlError> {
        let urls = page_urls(leaf, self.pages)?;
        let fetched = try_join_all(urls.iter().map(|url| self.source.fetch(url))).await?;
        Ok(assemble_from_pages(leaf, self.pages, &fetched))
    }
}
