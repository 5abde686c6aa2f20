// src/aggregation/mod.rs
//! Build Aggregation
//!
//! Derives indexed, browsable artifacts from one build's raw documentation:
//! per-use-case scenario summaries, per-scenario page-grouped step
//! sequences, a global object reference index and build statistics.
//! Aggregation is idempotent and versioned; derived data is recomputed only
//! when the raw data or the format version changes.

mod aggregator;
mod long_names;
mod object_repository;
mod pages;
mod sanitizer;
mod statistics;

pub use aggregator::{BuildAggregator, CURRENT_FILE_FORMAT_VERSION};
pub use long_names::{LongObjectNamesResolver, MAX_SHORT_KEY_LENGTH};
pub use object_repository::{ObjectRepository, ReferencePath};
pub use pages::{StepsAndPagesAggregator, UNKNOWN_PAGE_NAME};
pub use sanitizer::{sanitize_page_names, DefaultPageNameSanitizer, PageNameSanitizer};
pub use statistics::BuildStatistics;
