//! Pipeline driver: root → listing levels → leaves → records → sink
//!
//! Every level is a stream stage that fetches up to `concurrency` pages at
//! once and keeps document order. Leaves are assembled out of order and
//! written as soon as they complete. A failed page becomes a [`Failure`]
//! that travels down the stream in place of its subtree, so nothing else is
//! affected by it.

use std::fmt;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::assembler::Assembler;
use crate::config::CatalogConfig;
use crate::error::SinkError;
use crate::hierarchy::{HierarchyLevel, Walker};
use crate::record::AttributeRecord;
use crate::sink::RecordSink;
use crate::source::DocumentSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pages fetched at once per stage.
    pub concurrency: usize,
    /// Stop discovering leaves after this many.
    pub max_leaves: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_leaves: None,
        }
    }
}

/// Where in the crawl a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Expanding a listing page of the named level.
    Level(String),
    /// Assembling a leaf record.
    Leaf,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(name) => write!(f, "level:{name}"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

/// A URL whose branch or record was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub url: Url,
    pub stage: Stage,
    pub error: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Leaves reached, whether or not they produced a record.
    pub leaves: usize,
    pub records: usize,
    pub malformed_fields: usize,
    pub failures: Vec<Failure>,
    pub cancelled: bool,
}

type Frontier<'a> = BoxStream<'a, Result<Url, Failure>>;

pub struct Pipeline<S> {
    source: S,
    catalog: CatalogConfig,
    settings: PipelineSettings,
    cancel: CancellationToken,
}

impl<S: DocumentSource> Pipeline<S> {
    pub fn new(source: S, catalog: CatalogConfig, settings: PipelineSettings) -> Self {
        Self {
            source,
            catalog,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    /// Crawl the whole catalog, writing each record to `sink` as it completes.
    ///
    /// Per-URL failures are collected in the report. Only a sink error aborts
    /// the run.
    pub async fn run(&self, sink: &dyn RecordSink) -> Result<CrawlReport, SinkError> {
        tracing::info!(
            root = %self.catalog.root,
            levels = self.catalog.levels.len(),
            concurrency = self.concurrency(),
            "starting crawl"
        );

        let mut outcomes = self.records(self.leaves());
        let mut report = CrawlReport::default();

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(record) => {
                    report.leaves += 1;
                    report.malformed_fields += record.malformed().count();
                    sink.write(&record)?;
                    report.records += 1;
                }
                Err(failure) => {
                    if failure.stage == Stage::Leaf {
                        report.leaves += 1;
                    }
                    tracing::warn!(
                        url = %failure.url,
                        stage = %failure.stage,
                        error = %failure.error,
                        "crawl failure"
                    );
                    report.failures.push(failure);
                }
            }
        }

        sink.flush()?;
        report.cancelled = self.cancel.is_cancelled();

        tracing::info!(
            leaves = report.leaves,
            records = report.records,
            failures = report.failures.len(),
            malformed_fields = report.malformed_fields,
            cancelled = report.cancelled,
            "crawl finished"
        );
        Ok(report)
    }

    fn concurrency(&self) -> usize {
        self.settings.concurrency.max(1)
    }

    /// Leaf URLs in document order, with failed branches in their place.
    fn leaves(&self) -> Frontier<'_> {
        let root = stream::iter([Ok(self.catalog.root.clone())]).boxed();
        let frontier = self
            .catalog
            .levels
            .iter()
            .fold(root, |upstream, level| self.expand(upstream, level));

        let Some(limit) = self.settings.max_leaves else {
            return frontier;
        };

        // Ends as soon as the last admitted leaf is out, without pulling the
        // frontier for one more.
        stream::unfold((frontier, 0usize), move |(mut frontier, admitted)| async move {
            if admitted >= limit {
                return None;
            }
            let Some(item) = frontier.next().await else {
                return None;
            };
            let admitted = admitted + usize::from(item.is_ok());
            Some((item, (frontier, admitted)))
        })
        .boxed()
    }

    fn expand<'a>(&'a self, upstream: Frontier<'a>, level: &'a HierarchyLevel) -> Frontier<'a> {
        upstream
            .take_while(move |_| future::ready(!self.cancel.is_cancelled()))
            .map(move |item| async move {
                let url = match item {
                    Ok(url) => url,
                    Err(failure) => return vec![Err(failure)],
                };
                match Walker::new(&self.source).children(&url, level).await {
                    Ok(children) => children.into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(Failure {
                        url,
                        stage: Stage::Level(level.name.clone()),
                        error: err.to_string(),
                    })],
                }
            })
            .buffered(self.concurrency())
            .flat_map(stream::iter)
            .boxed()
    }

    fn records<'a>(&'a self, leaves: Frontier<'a>) -> BoxStream<'a, Result<AttributeRecord, Failure>> {
        leaves
            .take_while(move |_| future::ready(!self.cancel.is_cancelled()))
            .map(move |item| async move {
                let leaf = match item {
                    Ok(leaf) => leaf,
                    Err(failure) => return Err(failure),
                };
                tracing::debug!(leaf = %leaf, "assembling leaf");
                Assembler::new(&self.source, &self.catalog.pages)
                    .assemble(&leaf)
                    .await
                    .map_err(|err| Failure {
                        url: leaf.clone(),
                        stage: Stage::Leaf,
                        error: err.to_string(),
                    })
            })
            .buffer_unordered(self.concurrency())
            .boxed()
    }
}
