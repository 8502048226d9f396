//! Rule-based validation engine for natural-language definitions.
//!
//! This crate provides:
//! - YAML rule documents (rule sets, thresholds) with two-pass deserialization
//! - Filesystem loader with hot-reload via `notify` watcher
//! - An immutable, atomically swappable rule catalog with explicit degraded mode
//! - A registry of built-in lexical and structural checks
//! - Per-rule error isolation, weighted category scoring and verdicts
//! - Sequential or concurrent batch validation with order-stable results

pub mod batch;
pub mod catalog;
pub mod checks;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod report;
pub mod result;
pub mod schema;
pub mod scoring;
pub mod validator;

pub use batch::{validate_batch, validate_batch_until, BatchOptions, BatchReport, ContractViolation};
pub use catalog::{Catalog, CatalogHandle, CatalogOptions, DegradedMode, RuleDefinition};
pub use checks::{CheckError, CheckOutcome, CheckRegistry, PrepareFn, Prepared};
pub use context::{EvaluationContext, ValidateOptions};
pub use error::EngineError;
pub use loader::{CatalogSource, ConfigError, InlineDocument, RuleLoader};
pub use result::{RuleResult, ValidationResult, ValidationSummary, RESULT_VERSION};
pub use validator::DefinitionValidator;
