//! RuleSet document kind: a named group of rule definitions.

use serde::{Deserialize, Serialize};

use definitie_core::Category;

use super::metadata::default_true;
use super::{CheckParams, CommonMetadata};

/// Top-level RuleSet document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: RuleSetSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetSpec {
    pub rules: Vec<RuleSpec>,
}

/// One rule as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Unique across the whole catalog, e.g. `CIRC-01`.
    pub code: String,
    pub category: Category,
    /// Contribution to the category mean. `0` makes the rule advisory.
    pub weight: f64,
    /// Lower runs first within a category.
    #[serde(default)]
    pub priority: i32,
    pub explanation: String,
    /// Identifier of a registered check implementation.
    pub check: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "CheckParams::is_empty")]
    pub params: CheckParams,
}
