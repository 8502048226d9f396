//! Single-definition validation pipeline.
//!
//! context build -> rule evaluation -> category aggregation -> verdict.
//!
//! The validator itself holds only the catalog handle. Everything that
//! belongs to one call lives in that call's [`EvaluationContext`] and is
//! passed down explicitly, so concurrent calls on one validator share
//! nothing but the read-only catalog.

use std::sync::Arc;

use tracing::debug;

use definitie_core::{Category, DefinitionItem, InputError};

use crate::catalog::{Catalog, CatalogHandle};
use crate::context::{EvaluationContext, ValidateOptions};
use crate::evaluator::RuleEvaluator;
use crate::result::{ErroredRule, RuleResult, ValidationResult, Violation, RESULT_VERSION};
use crate::scoring::{aggregate_category, aggregate_overall};

/// Validates definitions against the active catalog.
#[derive(Debug, Clone)]
pub struct DefinitionValidator {
    handle: Arc<CatalogHandle>,
}

impl DefinitionValidator {
    pub fn new(handle: Arc<CatalogHandle>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Arc<CatalogHandle> {
        &self.handle
    }

    /// Snapshot of the catalog new calls will use.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.handle.current()
    }

    /// Validate one definition.
    ///
    /// An empty term or text is an [`InputError`]; no result is produced.
    /// Rule failures of any kind end up inside the returned result.
    pub fn validate(
        &self,
        term: &str,
        text: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationResult, InputError> {
        validate_with(&self.handle.current(), term, text, options)
    }

    pub fn validate_item(&self, item: &DefinitionItem) -> Result<ValidationResult, InputError> {
        self.validate(&item.term, &item.text, &ValidateOptions::from(item))
    }
}

/// Validate one definition against a fixed catalog snapshot.
pub fn validate_with(
    catalog: &Catalog,
    term: &str,
    text: &str,
    options: &ValidateOptions,
) -> Result<ValidationResult, InputError> {
    let ctx = EvaluationContext::build(term, text, options)?;
    let rule_results = evaluate_rules(catalog, &ctx);
    Ok(assemble_result(catalog, &ctx, rule_results))
}

/// Run every enabled rule of `catalog` against `ctx`, in catalog order.
pub fn evaluate_rules(catalog: &Catalog, ctx: &EvaluationContext) -> Vec<RuleResult> {
    RuleEvaluator::new(catalog.registry()).evaluate_all(catalog.rules_for(&Category::ALL), ctx)
}

/// Aggregate per-rule results into the final [`ValidationResult`].
pub fn assemble_result(
    catalog: &Catalog,
    ctx: &EvaluationContext,
    mut rule_results: Vec<RuleResult>,
) -> ValidationResult {
    let thresholds = catalog.thresholds();

    let category_scores: Vec<_> = Category::ALL
        .iter()
        .map(|&category| {
            let in_category: Vec<&RuleResult> =
                rule_results.iter().filter(|r| r.category == category).collect();
            aggregate_category(category, thresholds.weight(category), &in_category)
        })
        .collect();
    let verdict = aggregate_overall(&category_scores, thresholds);

    rule_results.sort_by(|a, b| a.code.cmp(&b.code));

    let violations: Vec<Violation> = rule_results
        .iter()
        .filter(|r| r.is_violation())
        .map(|r| Violation {
            code: r.code.clone(),
            category: r.category,
            message: r.violation_message.clone().unwrap_or_default(),
            advisory: r.advisory,
        })
        .collect();
    let passed_rules: Vec<String> = rule_results
        .iter()
        .filter(|r| r.passed)
        .map(|r| r.code.clone())
        .collect();
    let errored_rules: Vec<ErroredRule> = rule_results
        .iter()
        .filter_map(|r| {
            r.error_detail.as_ref().map(|error| ErroredRule {
                code: r.code.clone(),
                category: r.category,
                error: error.clone(),
            })
        })
        .collect();

    debug!(
        correlation_id = %ctx.correlation_id(),
        overall_score = verdict.overall_score,
        acceptable = verdict.is_acceptable,
        violations = violations.len(),
        errored = errored_rules.len(),
        "definition validated"
    );

    ValidationResult {
        version: RESULT_VERSION.to_string(),
        term: ctx.term().to_string(),
        overall_score: verdict.overall_score,
        is_acceptable: verdict.is_acceptable,
        threshold: thresholds.overall,
        category_scores,
        violations,
        passed_rules,
        errored_rules,
        rule_results,
        rejection_reasons: verdict.rejection_reasons,
        degraded: catalog.degraded().cloned(),
        correlation_id: ctx.correlation_id().to_string(),
    }
}
