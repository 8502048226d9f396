//! Batch outcome and the determinism contract between batch runs.

use serde::{Deserialize, Serialize};

use definitie_core::InputError;

use crate::result::ValidationResult;

use super::progress::ItemState;

/// An internal invariant of batch evaluation was broken.
///
/// Should be unreachable; seeing one means per-item data leaked between
/// concurrently evaluated items.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractViolation {
    #[error("result slot {index} was filled twice")]
    SlotFilledTwice { index: usize },

    #[error("no result slot {index}")]
    UnknownSlot { index: usize },

    #[error("item {index} cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        index: usize,
        from: ItemState,
        to: ItemState,
    },

    #[error("batch sizes differ: {left} vs {right} items")]
    LengthMismatch { left: usize, right: usize },

    #[error("item {index} differs between runs: {detail}")]
    Divergent { index: usize, detail: String },
}

/// Outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemReport {
    /// Position in the input.
    pub index: usize,
    /// `Done`, `Errored`, or the last state reached before the batch was cut off.
    pub state: ItemState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_error: Option<InputError>,
}

impl BatchItemReport {
    /// Cut off before finishing; carries no result.
    pub fn is_abandoned(&self) -> bool {
        !self.state.is_final()
    }
}

/// Ordered outcomes of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per input item, in input order.
    pub items: Vec<BatchItemReport>,
    /// Timeout or shutdown stopped the batch before every item finished.
    pub partial: bool,
    /// Generation of the catalog snapshot the whole batch ran against.
    pub catalog_generation: u64,
}

impl BatchReport {
    /// Per-item results in input order; `None` for errored or abandoned items.
    pub fn results(&self) -> impl Iterator<Item = Option<&ValidationResult>> {
        self.items.iter().map(|i| i.result.as_ref())
    }

    pub fn completed(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_some()).count()
    }

    pub fn errored(&self) -> usize {
        self.items.iter().filter(|i| i.input_error.is_some()).count()
    }

    pub fn abandoned(&self) -> usize {
        self.items.iter().filter(|i| i.is_abandoned()).count()
    }

    /// Every item finished and was accepted.
    pub fn all_acceptable(&self) -> bool {
        !self.partial
            && self
                .items
                .iter()
                .all(|i| i.result.as_ref().is_some_and(|r| r.is_acceptable))
    }

    /// Check that `other` (a run over the same input) produced the same
    /// outcome for every item, correlation ids aside.
    pub fn ensure_matches(&self, other: &BatchReport) -> Result<(), ContractViolation> {
        if self.items.len() != other.items.len() {
            return Err(ContractViolation::LengthMismatch {
                left: self.items.len(),
                right: other.items.len(),
            });
        }

        for (a, b) in self.items.iter().zip(&other.items) {
            let divergent = |detail: String| ContractViolation::Divergent {
                index: a.index,
                detail,
            };
            if a.state != b.state {
                return Err(divergent(format!("state {:?} vs {:?}", a.state, b.state)));
            }
            if a.input_error != b.input_error {
                return Err(divergent(format!(
                    "input error {:?} vs {:?}",
                    a.input_error, b.input_error
                )));
            }
            match (&a.result, &b.result) {
                (Some(x), Some(y)) if !x.same_outcome(y) => {
                    return Err(divergent(format!(
                        "term '{}' scored {} vs {} ({} vs {} violations)",
                        x.term,
                        x.overall_score,
                        y.overall_score,
                        x.violations.len(),
                        y.violations.len()
                    )));
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(divergent("result present in only one run".to_string()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
