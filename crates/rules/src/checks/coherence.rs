//! Coherence checks on how genus and qualifiers hang together.

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::ParamKind;

use super::{list_param, opt_list_param, CheckError, CheckOutcome, CheckRegistry, ParamSpec};

const CONCRETE_GENUS_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("vague", ParamKind::List),
    ParamSpec::optional("skip", ParamKind::List),
];

const NO_DANGLING_QUALIFIER_PARAMS: &[ParamSpec] = &[ParamSpec::required("qualifiers", ParamKind::List)];

pub(super) fn register(registry: &mut CheckRegistry) {
    registry
        .register("concrete_genus", concrete_genus, CONCRETE_GENUS_PARAMS)
        .register(
            "no_dangling_qualifier",
            no_dangling_qualifier,
            NO_DANGLING_QUALIFIER_PARAMS,
        );
}

fn listed(words: &[String], token: &str) -> bool {
    words.iter().any(|w| w.to_lowercase() == token)
}

/// The genus (first token not in `skip`, typically articles) must not be
/// one of the `vague` placeholder words such as "iets" or "ding".
fn concrete_genus(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let vague = list_param(&rule.params, "vague")?;
    let skip = opt_list_param(&rule.params, "skip")?.unwrap_or_default();

    let genus = ctx.tokens().iter().find(|t| !listed(skip, t));
    Ok(match genus {
        Some(word) if listed(vague, word) => {
            CheckOutcome::fail(format!("genus '{}' is too vague", word))
        }
        Some(_) => CheckOutcome::pass(),
        None => CheckOutcome::fail("definition has no genus"),
    })
}

/// The definition must not end on a qualifier that introduces nothing,
/// e.g. a trailing "die" or "waarbij".
fn no_dangling_qualifier(rule: &RuleDefinition, ctx: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
    let qualifiers = list_param(&rule.params, "qualifiers")?;

    Ok(match ctx.tokens().last() {
        Some(last) if listed(qualifiers, last) => {
            CheckOutcome::fail(format!("definition ends on the qualifier '{}'", last))
        }
        _ => CheckOutcome::pass(),
    })
}
