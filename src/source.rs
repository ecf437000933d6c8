//! Document sources: where catalog pages come from
//!
//! [`HttpSource`] fetches over the network with reqwest. [`MemorySource`]
//! serves a fixed set of pages for dry runs and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::config::SourceConfig;
use crate::error::{ConfigError, FetchError};

/// A fetched page. Parsing is deferred so pages can cross await points.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub html: String,
}

impl Page {
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Retrieves one page per call. No retries, no caching.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP source backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        tracing::debug!(url = %url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(transport)?;
        Ok(Page {
            url: final_url,
            html,
        })
    }
}

/// Fixed URL → HTML map.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: HashMap<Url, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. Panics on an unparsable URL, so only use it with literals.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        let url = Url::parse(url).unwrap_or_else(|e| panic!("invalid page URL {url}: {e}"));
        self.pages.insert(url, html.into());
        self
    }

    /// Drop a page, e.g. to simulate an unreachable URL.
    pub fn without_page(mut self, url: &str) -> Self {
        if let Ok(url) = Url::parse(url) {
            self.pages.remove(&url);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        self.pages
            .get(url)
            .map(|html| Page {
                url: url.clone(),
                html: html.clone(),
            })
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }
}
