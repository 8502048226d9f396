//! Structural checks: sentence shape, openings and length.

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::{CheckParams, ParamKind};

use super::{
    bool_param, list_param, opt_number_param, phrase_tokens, CheckError, CheckOutcome, CheckRegistry,
    ParamSpec, Prepared,
};

const FORBIDDEN_OPENING_PARAMS: &[ParamSpec] = &[ParamSpec::required("phrases", ParamKind::List)];

const WORD_COUNT_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("min", ParamKind::Number),
    ParamSpec::optional("max", ParamKind::Number),
    ParamSpec::optional("strict", ParamKind::Bool),
];

const ENDS_WITH_PERIOD_PARAMS: &[ParamSpec] = &[ParamSpec::optional("expected", ParamKind::Bool)];

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

pub(super) fn register(registry: &mut CheckRegistry) {
    registry
        .register("forbidden_opening", forbidden_opening, FORBIDDEN_OPENING_PARAMS)
        .register("single_sentence", single_sentence, &[])
        .register_prepared("word_count", word_count, WORD_COUNT_PARAMS, prepare_word_count)
        .register("ends_with_period", ends_with_period, ENDS_WITH_PERIOD_PARAMS);
}

/// The definition must not open with any of the configured phrases.
///
/// Phrases are compared token by token, so `de` does not match `definitie`.
fn forbidden_opening(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let phrases = list_param(&rule.params, "phrases")?;
    let tokens = ctx.tokens();

    for phrase in phrases {
        let needle = phrase_tokens(phrase);
        if !needle.is_empty() && tokens.starts_with(&needle) {
            return Ok(CheckOutcome::fail(format!(
                "definition opens with '{}'",
                needle.join(" ")
            )));
        }
    }
    Ok(CheckOutcome::pass())
}

/// The definition must be one sentence: no terminator followed by more text.
fn single_sentence(_rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let text = ctx.normalized_text();
    let sentences = text
        .split(|c: char| SENTENCE_TERMINATORS.contains(&c))
        .filter(|part| part.chars().any(char::is_alphanumeric))
        .count();

    if sentences > 1 {
        return Ok(CheckOutcome::fail(format!(
            "definition contains {} sentences",
            sentences
        )));
    }
    Ok(CheckOutcome::pass())
}

/// `[min, max]`, defaulting to `[0, inf)`.
fn word_range(params: &CheckParams) -> Result<(f64, f64), CheckError> {
    let min = opt_number_param(params, "min")?.unwrap_or(0.0);
    let max = opt_number_param(params, "max")?.unwrap_or(f64::INFINITY);
    if min < 0.0 {
        return Err(CheckError::InvalidParam {
            param: "min".to_string(),
            message: format!("must be >= 0, got {}", min),
        });
    }
    if max < min {
        return Err(CheckError::InvalidParam {
            param: "max".to_string(),
            message: format!("range [{}, {}] is empty", min, max),
        });
    }
    Ok((min, max))
}

fn prepare_word_count(params: &CheckParams) -> Result<Option<Prepared>, CheckError> {
    word_range(params).map(|_| None)
}

/// Word count must lie within `[min, max]`.
///
/// Outside the range the rule fails with a partial score proportional to
/// how close the count is, unless `strict` is set.
fn word_count(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let (min, max) = word_range(&rule.params)?;
    let strict = bool_param(&rule.params, "strict", false)?;

    let count = ctx.tokens().len() as f64;
    let (ratio, message) = if count < min {
        (count / min, format!("{} words, expected at least {}", count, min))
    } else if count > max {
        (max / count, format!("{} words, expected at most {}", count, max))
    } else {
        return Ok(CheckOutcome::pass());
    };

    Ok(if strict {
        CheckOutcome::fail(message)
    } else {
        CheckOutcome::partial(ratio, message)
    })
}

/// Whether the definition ends with a period must match `expected`
/// (default `true`).
fn ends_with_period(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let expected = bool_param(&rule.params, "expected", true)?;
    let has_period = ctx.normalized_text().ends_with('.');

    Ok(match (expected, has_period) {
        (true, false) => CheckOutcome::fail("definition does not end with a period"),
        (false, true) => CheckOutcome::fail("definition ends with a period"),
        _ => CheckOutcome::pass(),
    })
}
