//! Integrity checks: constructs a definition must never contain.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::{CheckParams, ParamKind};

use super::{
    bool_param, contains_sequence, list_param, opt_text_param, phrase_tokens, text_param, CheckError,
    CheckOutcome, CheckRegistry, ParamSpec, Prepared,
};

const FORBIDDEN_WORDS_PARAMS: &[ParamSpec] = &[ParamSpec::required("words", ParamKind::List)];

const FORBIDDEN_PATTERN_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("pattern", ParamKind::Text),
    ParamSpec::optional("case_insensitive", ParamKind::Bool),
    ParamSpec::optional("message", ParamKind::Text),
];

const BRACKETS: [char; 4] = ['(', ')', '[', ']'];

pub(super) fn register(registry: &mut CheckRegistry) {
    registry
        .register("forbidden_words", forbidden_words, FORBIDDEN_WORDS_PARAMS)
        .register_prepared(
            "forbidden_pattern",
            forbidden_pattern,
            FORBIDDEN_PATTERN_PARAMS,
            prepare_pattern,
        )
        .register("no_parenthetical", no_parenthetical, &[]);
}

/// None of `words` (single words or multi-word phrases) may appear.
///
/// Reports every hit, in the order the words are configured.
fn forbidden_words(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let words = list_param(&rule.params, "words")?;
    let hits: Vec<String> = words
        .iter()
        .map(|w| phrase_tokens(w))
        .filter(|needle| contains_sequence(ctx.tokens(), needle))
        .map(|needle| needle.join(" "))
        .collect();

    if hits.is_empty() {
        return Ok(CheckOutcome::pass());
    }
    Ok(CheckOutcome::fail(format!(
        "forbidden word(s): {}",
        hits.join(", ")
    )))
}

fn compile_pattern(params: &CheckParams) -> Result<Regex, CheckError> {
    let pattern = text_param(params, "pattern")?;
    let case_insensitive = bool_param(params, "case_insensitive", true)?;

    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| CheckError::InvalidParam {
            param: "pattern".to_string(),
            message: e.to_string(),
        })
}

fn prepare_pattern(params: &CheckParams) -> Result<Option<Prepared>, CheckError> {
    compile_pattern(params).map(|re| Some(Prepared::Pattern(re)))
}

/// The normalized text must not match `pattern`.
///
/// Catalog rules carry the expression compiled at build time; a rule built
/// by hand compiles it here.
fn forbidden_pattern(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let message = opt_text_param(&rule.params, "message")?;
    let re = match &rule.prepared {
        Some(Prepared::Pattern(re)) => Cow::Borrowed(re),
        None => Cow::Owned(compile_pattern(&rule.params)?),
    };

    Ok(match re.find(ctx.normalized_text()) {
        Some(m) => CheckOutcome::fail(match message {
            Some(msg) => format!("{} ('{}')", msg, m.as_str()),
            None => format!("matches forbidden pattern: '{}'", m.as_str()),
        }),
        None => CheckOutcome::pass(),
    })
}

/// The definition must not contain bracketed asides.
fn no_parenthetical(_rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    if ctx.raw_text().contains(&BRACKETS[..]) {
        return Ok(CheckOutcome::fail("definition contains a parenthetical remark"));
    }
    Ok(CheckOutcome::pass())
}
