//! Vehicle catalog crawler
//!
//! Walks a catalog organized as brand → model → generation → version →
//! engine listing pages and extracts one flat attribute record per engine:
//! - Hierarchy walking with depth-collapsing levels
//! - Declarative field extraction (locate, pick, transform, parse)
//! - Records assembled from a leaf page and pages derived from its URL
//! - Concurrent, streaming pipeline writing JSON lines

pub mod assembler;
pub mod autocentrum;
pub mod config;
pub mod error;
pub mod extractors;
pub mod hierarchy;
pub mod pipeline;
pub mod record;
pub mod sink;
pub mod source;

pub use assembler::{Assembler, PageSpec, PathSubstitution};
pub use config::{CatalogConfig, SourceConfig};
pub use error::*;
pub use extractors::*;
pub use hierarchy::{child_links, HierarchyLevel, Walker};
pub use pipeline::{CrawlReport, Failure, Pipeline, PipelineSettings, Stage};
pub use record::{AttributeRecord, FieldOutcome};
pub use sink::{JsonLinesSink, MemorySink, RecordSink};
pub use source::{DocumentSource, HttpSource, MemorySource, Page};
