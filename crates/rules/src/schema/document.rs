//! Multi-kind document container and accessors.

use super::{CommonMetadata, RuleKind, RuleSetDocument, ThresholdsDocument};

/// A fully deserialized document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Rule definitions: code, category, weight, priority, check reference.
    RuleSet(RuleSetDocument),
    /// Acceptance threshold and per-category weights/minimums.
    Thresholds(ThresholdsDocument),
}

impl RuleDocument {
    /// Get the document's metadata regardless of kind.
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::RuleSet(doc) => &doc.metadata,
            RuleDocument::Thresholds(doc) => &doc.metadata,
        }
    }

    /// Get the document kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDocument::RuleSet(_) => RuleKind::RuleSet,
            RuleDocument::Thresholds(_) => RuleKind::Thresholds,
        }
    }

    pub fn as_rule_set(&self) -> Option<&RuleSetDocument> {
        match self {
            RuleDocument::RuleSet(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_thresholds(&self) -> Option<&ThresholdsDocument> {
        match self {
            RuleDocument::Thresholds(doc) => Some(doc),
            _ => None,
        }
    }

    /// Serialize this document to YAML, delegating to the inner type.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            RuleDocument::RuleSet(doc) => serde_yaml::to_string(doc),
            RuleDocument::Thresholds(doc) => serde_yaml::to_string(doc),
        }
    }
}
