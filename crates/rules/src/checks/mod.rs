//! Built-in rule checks and the registry that maps check ids to them.
//!
//! Every check is a plain function of `(rule, context)`: it reads per-call
//! data only from the [`EvaluationContext`] and configuration only from the
//! [`RuleDefinition`]. Checks hold no state, so any number of evaluations can
//! run them at once.
//!
//! Checks with value constraints on their parameters (a regex, a range)
//! also register a [`PrepareFn`], so bad values fail the catalog build
//! instead of erroring the rule on every call.
//!
//! Checks by category:
//! - grammar: `singular_term`, `no_term_article`
//! - circularity: `term_not_in_definition`, `no_term_derivative`
//! - structure: `forbidden_opening`, `single_sentence`, `word_count`, `ends_with_period`
//! - coherence: `concrete_genus`, `no_dangling_qualifier`
//! - integrity: `forbidden_words`, `forbidden_pattern`, `no_parenthetical`

mod circularity;
mod coherence;
mod grammar;
mod integrity;
mod structure;

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::catalog::RuleDefinition;
use crate::context::EvaluationContext;
use crate::schema::{CheckParams, ParamKind, ParamValue};

// ── Check signature & outcome ───────────────────────────────────────

/// Signature every check implements.
pub type CheckFn = fn(&RuleDefinition, &EvaluationContext) -> Result<CheckOutcome, CheckError>;

/// Load-time parameter validation. Runs once per rule while the catalog is
/// built; an error there rejects the whole catalog.
pub type PrepareFn = fn(&CheckParams) -> Result<Option<Prepared>, CheckError>;

/// Compiled form of a rule's parameters, built once per catalog.
#[derive(Debug, Clone)]
pub enum Prepared {
    Pattern(Regex),
}

impl PartialEq for Prepared {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Prepared::Pattern(a), Prepared::Pattern(b)) => a.as_str() == b.as_str(),
        }
    }
}

/// What a check concluded about one definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub passed: bool,
    /// Contribution in `[0, 1]`; the evaluator clamps out-of-range values.
    pub score: f64,
    pub message: Option<String>,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            score: 1.0,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: 0.0,
            message: Some(message.into()),
        }
    }

    /// A failed check that still earns part of its score.
    pub fn partial(score: f64, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            score,
            message: Some(message.into()),
        }
    }
}

/// A check could not reach a verdict. Captured per rule by the evaluator;
/// never aborts sibling rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckError {
    #[error("missing parameter '{param}'")]
    MissingParam { param: String },

    #[error("invalid parameter '{param}': {message}")]
    InvalidParam { param: String, message: String },

    #[error("{0}")]
    Failed(String),
}

impl CheckError {
    /// Variant name, reported as the error type in rule results.
    pub fn type_name(&self) -> &'static str {
        match self {
            CheckError::MissingParam { .. } => "MissingParam",
            CheckError::InvalidParam { .. } => "InvalidParam",
            CheckError::Failed(_) => "Failed",
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// A parameter a check understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A registered check: the function, the parameters it accepts and an
/// optional load-time validator for their values.
#[derive(Clone, Copy)]
pub struct CheckEntry {
    pub run: CheckFn,
    pub params: &'static [ParamSpec],
    pub prepare: Option<PrepareFn>,
}

impl fmt::Debug for CheckEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckEntry")
            .field("params", &self.params)
            .field("prepare", &self.prepare.is_some())
            .finish_non_exhaustive()
    }
}

/// Maps check ids (as referenced by `check:` in rule sets) to implementations.
///
/// Populated once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    entries: HashMap<String, CheckEntry>,
}

impl CheckRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in check.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        grammar::register(&mut registry);
        circularity::register(&mut registry);
        structure::register(&mut registry);
        coherence::register(&mut registry);
        integrity::register(&mut registry);
        registry
    }

    /// Register (or replace) a check under `id`.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        run: CheckFn,
        params: &'static [ParamSpec],
    ) -> &mut Self {
        self.entries.insert(
            id.into(),
            CheckEntry {
                run,
                params,
                prepare: None,
            },
        );
        self
    }

    /// Register a check whose parameter values are validated at catalog build.
    pub fn register_prepared(
        &mut self,
        id: impl Into<String>,
        run: CheckFn,
        params: &'static [ParamSpec],
        prepare: PrepareFn,
    ) -> &mut Self {
        self.entries.insert(
            id.into(),
            CheckEntry {
                run,
                params,
                prepare: Some(prepare),
            },
        );
        self
    }

    pub fn get(&self, id: &str) -> Option<&CheckEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Parameter accessors ─────────────────────────────────────────────

fn invalid(param: &str, expected: ParamKind, found: &ParamValue) -> CheckError {
    CheckError::InvalidParam {
        param: param.to_string(),
        message: format!("expected {}, got {}", expected, found.kind()),
    }
}

/// Required string-list parameter.
pub(crate) fn list_param<'a>(params: &'a CheckParams, name: &str) -> Result<&'a [String], CheckError> {
    opt_list_param(params, name)?.ok_or_else(|| CheckError::MissingParam {
        param: name.to_string(),
    })
}

pub(crate) fn opt_list_param<'a>(
    params: &'a CheckParams,
    name: &str,
) -> Result<Option<&'a [String]>, CheckError> {
    match params.get(name) {
        None => Ok(None),
        Some(ParamValue::List(items)) => Ok(Some(items.as_slice())),
        Some(other) => Err(invalid(name, ParamKind::List, other)),
    }
}

pub(crate) fn opt_number_param(params: &CheckParams, name: &str) -> Result<Option<f64>, CheckError> {
    match params.get(name) {
        None => Ok(None),
        Some(ParamValue::Number(n)) if n.is_finite() => Ok(Some(*n)),
        Some(ParamValue::Number(n)) => Err(CheckError::InvalidParam {
            param: name.to_string(),
            message: format!("expected a finite number, got {}", n),
        }),
        Some(other) => Err(invalid(name, ParamKind::Number, other)),
    }
}

pub(crate) fn text_param<'a>(params: &'a CheckParams, name: &str) -> Result<&'a str, CheckError> {
    opt_text_param(params, name)?.ok_or_else(|| CheckError::MissingParam {
        param: name.to_string(),
    })
}

pub(crate) fn opt_text_param<'a>(params: &'a CheckParams, name: &str) -> Result<Option<&'a str>, CheckError> {
    match params.get(name) {
        None => Ok(None),
        Some(ParamValue::Text(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(name, ParamKind::Text, other)),
    }
}

pub(crate) fn bool_param(params: &CheckParams, name: &str, default: bool) -> Result<bool, CheckError> {
    match params.get(name) {
        None => Ok(default),
        Some(ParamValue::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(name, ParamKind::Bool, other)),
    }
}

/// Lowercased, whitespace-split phrase, for token-sequence matching.
pub(crate) fn phrase_tokens(phrase: &str) -> Vec<String> {
    crate::context::tokenize(phrase)
}

/// True when `needle` occurs as a contiguous run inside `haystack`.
pub(crate) fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidateOptions;
    use definitie_core::Category;

    /// Context for check unit tests.
    pub(super) fn ctx(term: &str, text: &str) -> EvaluationContext {
        EvaluationContext::build(term, text, &ValidateOptions::default()).unwrap()
    }

    #[test]
    fn builtin_registry_has_every_documented_check() {
        let registry = CheckRegistry::builtin();
        for id in [
            "singular_term",
            "no_term_article",
            "term_not_in_definition",
            "no_term_derivative",
            "forbidden_opening",
            "single_sentence",
            "word_count",
            "ends_with_period",
            "concrete_genus",
            "no_dangling_qualifier",
            "forbidden_words",
            "forbidden_pattern",
            "no_parenthetical",
        ] {
            assert!(registry.contains(id), "missing built-in check '{id}'");
        }
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn ids_are_sorted() {
        let registry = CheckRegistry::builtin();
        let ids = registry.ids();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn custom_registration_replaces_entry() {
        fn always_pass(_: &RuleDefinition, _: &EvaluationContext) -> Result<CheckOutcome, CheckError> {
            Ok(CheckOutcome::pass())
        }
        let mut registry = CheckRegistry::builtin();
        registry.register("forbidden_words", always_pass, &[]);
        assert!(registry.get("forbidden_words").unwrap().params.is_empty());
    }

    #[test]
    fn param_accessors_report_kind_mismatch() {
        let rule = RuleDefinition::new("T-01", Category::Integrity, "forbidden_words").with_params(
            crate::schema::CheckParams::new()
                .with("words", ParamValue::Text("etc".into()))
                .with("max", ParamValue::List(vec![])),
        );
        assert_eq!(
            list_param(&rule.params, "words").unwrap_err().type_name(),
            "InvalidParam"
        );
        assert!(matches!(
            opt_number_param(&rule.params, "max"),
            Err(CheckError::InvalidParam { .. })
        ));
        assert!(matches!(
            text_param(&rule.params, "pattern"),
            Err(CheckError::MissingParam { .. })
        ));
        assert!(bool_param(&rule.params, "case_insensitive", true).unwrap());
    }

    #[test]
    fn contains_sequence_matches_contiguous_runs_only() {
        let hay: Vec<String> = ["een", "juridisch", "contract", "is"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let needle = vec!["juridisch".to_string(), "contract".to_string()];
        assert!(contains_sequence(&hay, &needle));
        let split = vec!["een".to_string(), "contract".to_string()];
        assert!(!contains_sequence(&hay, &split));
        assert!(!contains_sequence(&hay, &[]));
    }
}
