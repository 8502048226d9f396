//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported document kinds for two-pass deserialization dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    RuleSet,
    Thresholds,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::RuleSet => write!(f, "RuleSet"),
            RuleKind::Thresholds => write!(f, "Thresholds"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "RuleSet" => Ok(RuleKind::RuleSet),
            "Thresholds" => Ok(RuleKind::Thresholds),
            other => Err(format!("unknown document kind: '{}'", other)),
        }
    }
}
