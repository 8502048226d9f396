//! YAML schema types with serde deserialization.
//!
//! Defines the type hierarchy for rule documents:
//! - `RuleEnvelope`: lightweight first-pass header (apiVersion, kind, metadata)
//! - `RuleDocument`: enum dispatching to kind-specific types
//! - `RuleSetDocument`: a named group of rule definitions
//! - `ThresholdsDocument`: overall threshold plus per-category weights/minimums

mod document;
mod envelope;
mod kind;
mod metadata;
mod params;
mod rule_set;
mod thresholds;

pub use document::*;
pub use envelope::*;
pub use kind::*;
pub use metadata::*;
pub use params::*;
pub use rule_set::*;
pub use thresholds::*;
