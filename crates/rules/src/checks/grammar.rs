//! Grammatical-form checks on the defined term.

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::ParamKind;

use super::{list_param, opt_list_param, CheckError, CheckOutcome, CheckRegistry, ParamSpec};

const SINGULAR_TERM_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("suffixes", ParamKind::List),
    ParamSpec::optional("exceptions", ParamKind::List),
];

const NO_TERM_ARTICLE_PARAMS: &[ParamSpec] = &[ParamSpec::required("articles", ParamKind::List)];

pub(super) fn register(registry: &mut CheckRegistry) {
    registry
        .register("singular_term", singular_term, SINGULAR_TERM_PARAMS)
        .register("no_term_article", no_term_article, NO_TERM_ARTICLE_PARAMS);
}

/// The term's head word (its last token) must not carry a plural suffix.
///
/// Words listed under `exceptions` are singular despite their ending.
fn singular_term(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let suffixes = list_param(&rule.params, "suffixes")?;
    let exceptions = opt_list_param(&rule.params, "exceptions")?.unwrap_or_default();

    let Some(head) = ctx.term_tokens().last() else {
        return Ok(CheckOutcome::pass());
    };
    if exceptions.iter().any(|e| e.to_lowercase() == *head) {
        return Ok(CheckOutcome::pass());
    }

    let plural = suffixes.iter().map(|s| s.to_lowercase()).find(|suffix| {
        // The suffix alone is not a plural, e.g. "en" itself.
        !suffix.is_empty() && head.len() > suffix.len() && head.ends_with(suffix.as_str())
    });

    Ok(match plural {
        Some(suffix) => CheckOutcome::fail(format!(
            "term '{}' looks plural (ends in '-{}')",
            ctx.term(),
            suffix
        )),
        None => CheckOutcome::pass(),
    })
}

/// The term must not start with an article.
fn no_term_article(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let articles = list_param(&rule.params, "articles")?;
    let Some(first) = ctx.term_tokens().first() else {
        return Ok(CheckOutcome::pass());
    };

    Ok(match articles.iter().find(|a| a.to_lowercase() == *first) {
        Some(article) => CheckOutcome::fail(format!(
            "term '{}' starts with the article '{}'",
            ctx.term(),
            article
        )),
        None => CheckOutcome::pass(),
    })
}
