use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-call input errors. A definition that fails here never reaches rule
/// evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputError {
    #[error("term must not be empty or blank")]
    EmptyTerm,

    #[error("definition text must not be empty or blank")]
    EmptyText,
}
