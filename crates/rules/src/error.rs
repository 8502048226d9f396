//! Crate-wide error type for callers that want a single error to match on.

use definitie_core::InputError;

use crate::batch::ContractViolation;
use crate::loader::ConfigError;

/// Any error the engine can surface.
///
/// Rule execution errors never appear here; they stay inside the result as
/// errored rules.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("concurrency contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

impl EngineError {
    /// Only configuration errors stop the engine; everything else is per call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Config(_))
    }
}
