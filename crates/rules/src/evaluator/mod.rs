//! Runs rule checks against an evaluation context, one rule at a time.
//!
//! Each rule is isolated: a check that returns an error, produces a
//! non-finite score, or panics yields an errored [`RuleResult`] for that
//! rule while every other rule in the call is evaluated normally.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{trace, warn};

use crate::catalog::RuleDefinition;
use crate::checks::CheckRegistry;
use crate::context::EvaluationContext;
use crate::result::RuleResult;

// ── Rule evaluator ──────────────────────────────────────────────────

/// Evaluates rules with the checks of one registry.
///
/// Holds only a shared reference to the registry; all per-call data comes
/// in through the `ctx` argument.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'r> {
    registry: &'r CheckRegistry,
}

impl<'r> RuleEvaluator<'r> {
    pub fn new(registry: &'r CheckRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate one rule. Never fails and never panics.
    pub fn evaluate(&self, rule: &RuleDefinition, ctx: &EvaluationContext) -> RuleResult {
        let Some(entry) = self.registry.get(&rule.check) else {
            return self.errored(
                rule,
                ctx,
                "UnknownCheck",
                format!("check '{}' is not registered", rule.check),
            );
        };

        let result = match catch_unwind(AssertUnwindSafe(|| (entry.run)(rule, ctx))) {
            Ok(Ok(outcome)) if !outcome.score.is_finite() => self.errored(
                rule,
                ctx,
                "InvalidScore",
                format!("check returned non-finite score {}", outcome.score),
            ),
            Ok(Ok(outcome)) => RuleResult::checked(
                rule,
                outcome.passed,
                outcome.score.clamp(0.0, 1.0),
                outcome.message,
            ),
            Ok(Err(e)) => self.errored(rule, ctx, e.type_name(), e.to_string()),
            Err(payload) => self.errored(rule, ctx, "Panic", panic_message(payload.as_ref())),
        };

        trace!(
            rule_code = %rule.code,
            correlation_id = %ctx.correlation_id(),
            passed = result.passed,
            errored = result.errored,
            score = result.score,
            "rule evaluated"
        );
        result
    }

    /// Evaluate `rules` in the order given.
    pub fn evaluate_all<'a>(
        &self,
        rules: impl IntoIterator<Item = &'a RuleDefinition>,
        ctx: &EvaluationContext,
    ) -> Vec<RuleResult> {
        rules.into_iter().map(|rule| self.evaluate(rule, ctx)).collect()
    }

    fn errored(&self, rule: &RuleDefinition, ctx: &EvaluationContext, kind: &str, message: String) -> RuleResult {
        warn!(
            rule_code = %rule.code,
            check = %rule.check,
            correlation_id = %ctx.correlation_id(),
            kind,
            error = %message,
            "rule execution failed"
        );
        RuleResult::errored(rule, kind, message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: <non-string payload>".to_string()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
