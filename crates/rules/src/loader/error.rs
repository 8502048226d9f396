//! Configuration error taxonomy and per-file load results.

use std::path::PathBuf;

use definitie_core::Category;

/// Errors that make a rule configuration unusable. Fatal at startup; on
/// reload the previous catalog stays active.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Envelope was readable but the kind-specific document was not.
    #[error("invalid document '{origin}': {message}")]
    Document { origin: String, message: String },

    #[error("duplicate rule code '{code}' (in '{first}' and '{second}')")]
    DuplicateCode {
        code: String,
        first: String,
        second: String,
    },

    #[error("rule '{code}' has invalid weight {weight} (must be a finite number >= 0)")]
    NegativeWeight { code: String, weight: f64 },

    #[error("rule '{code}' references unknown check '{check}'{}", did_you_mean(.suggestion))]
    UnknownCheck {
        code: String,
        check: String,
        suggestion: Option<String>,
    },

    #[error("rule '{code}': parameter '{param}' {message}")]
    InvalidParam {
        code: String,
        param: String,
        message: String,
    },

    #[error("thresholds do not configure required category '{0}'")]
    MissingCategory(Category),

    #[error("no Thresholds document was loaded")]
    MissingThresholds,

    #[error("more than one Thresholds document ('{first}' and '{second}')")]
    DuplicateThresholds { first: String, second: String },

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("no rule sets were loaded")]
    NoRuleSources,

    /// Strict mode refuses to run with partial coverage.
    #[error("strict mode: {} rule source(s) failed to load: {}", .failures.len(), .failures.join(", "))]
    StrictLoad { failures: Vec<String> },

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

/// Result alias for loader and catalog operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Outcome of loading a single source.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Path or inline name of the source.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single source load attempt.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// Document was successfully loaded.
    Loaded { document_id: String },
    /// Source was skipped (dotfile, non-YAML, disabled, etc.).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}

impl LoadResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }
}
