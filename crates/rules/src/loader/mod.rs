//! Rule source loading with hot-reload via `notify` watcher.
//!
//! Reads YAML documents from a directory (recursively) or from in-memory
//! strings, using two-pass deserialization (RuleEnvelope -> RuleDocument).
//! Per-file failures are reported, not fatal; the catalog decides whether the
//! remaining documents are enough to run in degraded mode.

mod core;
mod error;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::{parse_document, CatalogSource, InlineDocument, LoadedDocuments, RuleLoader, SourcedDocument};
pub use self::error::{ConfigError, LoadResult, LoadStatus, Result};
