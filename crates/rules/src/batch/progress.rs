//! Per-item lifecycle tracking for batch runs.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::report::ContractViolation;

/// Lifecycle of one batch item.
///
/// `Pending -> ContextBuilt -> RulesEvaluating -> Aggregated -> Done`, or
/// `Pending -> Errored` when the context cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    ContextBuilt,
    RulesEvaluating,
    Aggregated,
    Done,
    Errored,
}

impl ItemState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ItemState::Pending,
            1 => ItemState::ContextBuilt,
            2 => ItemState::RulesEvaluating,
            3 => ItemState::Aggregated,
            4 => ItemState::Done,
            _ => ItemState::Errored,
        }
    }

    fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn can_advance_to(self, next: ItemState) -> bool {
        use ItemState::*;
        matches!(
            (self, next),
            (Pending, ContextBuilt)
                | (Pending, Errored)
                | (ContextBuilt, RulesEvaluating)
                | (RulesEvaluating, Aggregated)
                | (Aggregated, Done)
        )
    }

    pub fn is_final(self) -> bool {
        matches!(self, ItemState::Done | ItemState::Errored)
    }
}

/// Lock-free state board, one slot per batch item.
///
/// Written by the task that owns the item, read by the driver when the
/// report is assembled. Holds states only, never item data.
#[derive(Debug)]
pub struct ProgressBoard {
    states: Vec<AtomicU8>,
}

impl ProgressBoard {
    pub fn new(len: usize) -> Self {
        Self {
            states: (0..len).map(|_| AtomicU8::new(ItemState::Pending.as_u8())).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<ItemState> {
        self.states
            .get(index)
            .map(|s| ItemState::from_u8(s.load(Ordering::Acquire)))
    }

    /// Move item `index` to `next`, rejecting anything but a legal transition.
    pub fn advance(&self, index: usize, next: ItemState) -> Result<(), ContractViolation> {
        let slot = self
            .states
            .get(index)
            .ok_or(ContractViolation::UnknownSlot { index })?;

        slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
            ItemState::from_u8(raw)
                .can_advance_to(next)
                .then_some(next.as_u8())
        })
        .map_err(|raw| ContractViolation::IllegalTransition {
            index,
            from: ItemState::from_u8(raw),
            to: next,
        })?;

        trace!(index, state = ?next, "batch item advanced");
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ItemState> {
        self.states
            .iter()
            .map(|s| ItemState::from_u8(s.load(Ordering::Acquire)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
