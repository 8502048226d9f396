//! Circularity checks: does the definition restate the term it defines.

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::{CheckParams, ParamKind};

use super::{
    contains_sequence, opt_number_param, CheckError, CheckOutcome, CheckRegistry, ParamSpec, Prepared,
};

const DEFAULT_MIN_STEM: usize = 4;

const NO_TERM_DERIVATIVE_PARAMS: &[ParamSpec] = &[ParamSpec::optional("min_stem_length", ParamKind::Number)];

pub(super) fn register(registry: &mut CheckRegistry) {
    registry
        .register("term_not_in_definition", term_not_in_definition, &[])
        .register_prepared(
            "no_term_derivative",
            no_term_derivative,
            NO_TERM_DERIVATIVE_PARAMS,
            prepare_term_derivative,
        );
}

/// The term, as a whole-token sequence, must not occur in the definition.
fn term_not_in_definition(_rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    if contains_sequence(ctx.tokens(), ctx.term_tokens()) {
        return Ok(CheckOutcome::fail(format!(
            "definition repeats the term '{}'",
            ctx.term()
        )));
    }
    Ok(CheckOutcome::pass())
}

fn min_stem_length(params: &CheckParams) -> Result<usize, CheckError> {
    match opt_number_param(params, "min_stem_length")? {
        Some(n) if n < 1.0 => Err(CheckError::InvalidParam {
            param: "min_stem_length".to_string(),
            message: format!("must be at least 1, got {}", n),
        }),
        Some(n) => Ok(n as usize),
        None => Ok(DEFAULT_MIN_STEM),
    }
}

fn prepare_term_derivative(params: &CheckParams) -> Result<Option<Prepared>, CheckError> {
    min_stem_length(params).map(|_| None)
}

/// No token of the definition may extend the term's head word
/// (`contract` -> `contractueel`, `contractant`).
///
/// Heads shorter than `min_stem_length` are ignored to avoid matching
/// every word that happens to share a short prefix.
fn no_term_derivative(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let min_stem = min_stem_length(&rule.params)?;

    let Some(stem) = ctx.term_tokens().last() else {
        return Ok(CheckOutcome::pass());
    };
    if stem.chars().count() < min_stem {
        return Ok(CheckOutcome::pass());
    }

    let derived = ctx
        .tokens()
        .iter()
        .find(|token| token.len() > stem.len() && token.starts_with(stem.as_str()));

    Ok(match derived {
        Some(token) => CheckOutcome::fail(format!(
            "'{}' is derived from the term '{}'",
            token,
            ctx.term()
        )),
        None => CheckOutcome::pass(),
    })
}
