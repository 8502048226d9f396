//! Versioned result shape returned by every validation call.
//!
//! Everything here is plain data: built once per call by the validator,
//! handed to the caller and never retained by the engine.

use serde::{Deserialize, Serialize};

use definitie_core::Category;

use crate::catalog::{DegradedMode, RuleDefinition};

/// Version of the serialized [`ValidationResult`] shape.
pub const RESULT_VERSION: &str = "1.0";

/// Why a rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error variant, e.g. `InvalidParam` or `Panic`.
    pub kind: String,
    pub message: String,
}

/// Outcome of one rule for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub code: String,
    pub category: Category,
    pub passed: bool,
    pub errored: bool,
    /// In `[0, 1]`; always 0 for errored rules.
    pub score: f64,
    /// Weight-zero rule: reported, not scored.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub advisory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorDetail>,
}

impl RuleResult {
    pub fn checked(rule: &RuleDefinition, passed: bool, score: f64, message: Option<String>) -> Self {
        let violation_message = if passed {
            None
        } else {
            Some(message.unwrap_or_else(|| rule.explanation.clone()))
        };
        Self {
            code: rule.code.clone(),
            category: rule.category,
            passed,
            errored: false,
            score,
            advisory: rule.is_advisory(),
            violation_message,
            error_detail: None,
        }
    }

    pub fn errored(rule: &RuleDefinition, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: rule.code.clone(),
            category: rule.category,
            passed: false,
            errored: true,
            score: 0.0,
            advisory: rule.is_advisory(),
            violation_message: None,
            error_detail: Some(ErrorDetail {
                kind: kind.into(),
                message: message.into(),
            }),
        }
    }

    /// Failed without erroring.
    pub fn is_violation(&self) -> bool {
        !self.passed && !self.errored
    }
}

/// A failed rule as listed in [`ValidationResult::violations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub category: Category,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub advisory: bool,
}

/// A rule whose check errored, listed apart from violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErroredRule {
    pub code: String,
    pub category: Category,
    pub error: ErrorDetail,
}

/// Aggregate for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    /// Weight this category carried in the overall score.
    pub weight: f64,
    /// No scored rules ran: score is 1.0 and the category is left out of
    /// the overall weighting.
    pub vacuous: bool,
    pub passed_rules: Vec<String>,
    pub violated_rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errored_rules: Vec<String>,
}

/// Result of validating one definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub version: String,
    pub term: String,
    /// Rounded to 2 decimals.
    pub overall_score: f64,
    pub is_acceptable: bool,
    pub threshold: f64,
    /// One entry per category, in taxonomy order.
    pub category_scores: Vec<CategoryScore>,
    /// Sorted by code.
    pub violations: Vec<Violation>,
    /// Sorted by code.
    pub passed_rules: Vec<String>,
    /// Sorted by code.
    pub errored_rules: Vec<ErroredRule>,
    /// Every evaluated rule, sorted by code.
    pub rule_results: Vec<RuleResult>,
    pub rejection_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedMode>,
    pub correlation_id: String,
}

impl ValidationResult {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.category_scores.iter().find(|c| c.category == category)
    }

    /// Equal in every field except the correlation id.
    pub fn same_outcome(&self, other: &Self) -> bool {
        let Self {
            version,
            term,
            overall_score,
            is_acceptable,
            threshold,
            category_scores,
            violations,
            passed_rules,
            errored_rules,
            rule_results,
            rejection_reasons,
            degraded,
            correlation_id: _,
        } = self;

        *version == other.version
            && *term == other.term
            && *overall_score == other.overall_score
            && *is_acceptable == other.is_acceptable
            && *threshold == other.threshold
            && *category_scores == other.category_scores
            && *violations == other.violations
            && *passed_rules == other.passed_rules
            && *errored_rules == other.errored_rules
            && *rule_results == other.rule_results
            && *rejection_reasons == other.rejection_reasons
            && *degraded == other.degraded
    }

    /// Condensed view used for golden-file comparisons.
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            term: self.term.clone(),
            overall_score: self.overall_score,
            is_acceptable: self.is_acceptable,
            violations: self.violations.iter().map(|v| v.code.clone()).collect(),
            passed_rules: self.passed_rules.clone(),
            errored_rules: self.errored_rules.iter().map(|e| e.code.clone()).collect(),
            rejection_reasons: self.rejection_reasons.clone(),
        }
    }
}

/// Score, verdict and rule codes of a [`ValidationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub term: String,
    pub overall_score: f64,
    pub is_acceptable: bool,
    pub violations: Vec<String>,
    pub passed_rules: Vec<String>,
    #[serde(default)]
    pub errored_rules: Vec<String>,
    #[serde(default)]
    pub rejection_reasons: Vec<String>,
}
