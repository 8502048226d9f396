//! Thresholds document kind: acceptance threshold and category weighting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use definitie_core::Category;

use super::CommonMetadata;

/// Top-level Thresholds document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: ThresholdsSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsSpec {
    /// Minimum overall score for a definition to be acceptable.
    pub overall: f64,
    /// Every category of the taxonomy must appear here.
    pub categories: BTreeMap<Category, CategoryThreshold>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CategoryThreshold {
    pub weight: f64,
    /// Category score below this forces rejection, whatever the overall score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
}

/// Validated thresholds as held by the catalog.
pub type Thresholds = ThresholdsSpec;

impl ThresholdsSpec {
    pub fn weight(&self, category: Category) -> f64 {
        self.categories.get(&category).map(|c| c.weight).unwrap_or(0.0)
    }

    pub fn minimum(&self, category: Category) -> Option<f64> {
        self.categories.get(&category).and_then(|c| c.minimum)
    }

    pub fn weights(&self) -> BTreeMap<Category, f64> {
        self.categories
            .iter()
            .map(|(category, t)| (*category, t.weight))
            .collect()
    }
}
