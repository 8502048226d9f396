//! Per-call evaluation context.
//!
//! An [`EvaluationContext`] is built fresh for every validation call and
//! passed by reference through each step of that call. Its fields are
//! private and set only by [`EvaluationContext::build`]; there are no
//! setters and the type is not `Clone`, so a context cannot be altered
//! after construction or handed to a second call.

use std::collections::BTreeMap;

use uuid::Uuid;

use definitie_core::{DefinitionItem, InputError};

/// Optional per-call inputs besides term and text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateOptions {
    pub locale: Option<String>,
    /// Caller-supplied correlation id; a v4 UUID is generated when absent.
    pub correlation_id: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl ValidateOptions {
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl From<&DefinitionItem> for ValidateOptions {
    fn from(item: &DefinitionItem) -> Self {
        Self {
            locale: item.locale.clone(),
            correlation_id: item.correlation_id.clone(),
            metadata: item.metadata.clone(),
        }
    }
}

/// Immutable input bundle for one validation call.
#[derive(Debug)]
pub struct EvaluationContext {
    term: String,
    term_tokens: Vec<String>,
    raw_text: String,
    normalized_text: String,
    tokens: Vec<String>,
    locale: Option<String>,
    correlation_id: String,
    metadata: BTreeMap<String, String>,
}

impl EvaluationContext {
    /// Build the context for one call.
    ///
    /// Fails with [`InputError`] when the term or the text is empty or
    /// whitespace only.
    pub fn build(term: &str, text: &str, options: &ValidateOptions) -> Result<Self, InputError> {
        let term = collapse_whitespace(term);
        if term.is_empty() {
            return Err(InputError::EmptyTerm);
        }
        if text.trim().is_empty() {
            return Err(InputError::EmptyText);
        }

        let normalized_text = normalize(text);
        let correlation_id = options
            .correlation_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            term_tokens: tokenize(&term),
            term,
            raw_text: text.to_string(),
            tokens: tokenize(&normalized_text),
            normalized_text,
            locale: options.locale.clone(),
            correlation_id,
            metadata: options.metadata.clone(),
        })
    }

    /// The term with surrounding and repeated whitespace removed, case kept.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Lowercased word tokens of the term.
    pub fn term_tokens(&self) -> &[String] {
        &self.term_tokens
    }

    /// The text exactly as supplied.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Lowercased text with whitespace collapsed; punctuation is kept.
    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    /// Word tokens of the normalized text, stripped of edge punctuation.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and collapse runs of whitespace to single spaces.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Split into lowercase word tokens.
///
/// Punctuation at either end of a word is dropped; inner punctuation
/// (`e-mail`, `o.a`) stays part of the token. Pure punctuation vanishes.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_normalizes_and_tokenizes() {
        let ctx = EvaluationContext::build(
            "  Juridisch   feit ",
            "Een  Gebeurtenis,\tmet (juridische) gevolgen.",
            &ValidateOptions::default(),
        )
        .unwrap();

        assert_eq!(ctx.term(), "Juridisch feit");
        assert_eq!(ctx.term_tokens(), ["juridisch", "feit"]);
        assert_eq!(ctx.raw_text(), "Een  Gebeurtenis,\tmet (juridische) gevolgen.");
        assert_eq!(ctx.normalized_text(), "een gebeurtenis, met (juridische) gevolgen.");
        assert_eq!(ctx.tokens(), ["een", "gebeurtenis", "met", "juridische", "gevolgen"]);
    }

    #[test]
    fn blank_inputs_are_rejected() {
        let opts = ValidateOptions::default();
        assert_eq!(
            EvaluationContext::build("", "tekst", &opts).unwrap_err(),
            InputError::EmptyTerm
        );
        assert_eq!(
            EvaluationContext::build(" \t", "tekst", &opts).unwrap_err(),
            InputError::EmptyTerm
        );
        assert_eq!(
            EvaluationContext::build("Contract", "  \n", &opts).unwrap_err(),
            InputError::EmptyText
        );
    }

    #[test]
    fn correlation_id_is_generated_unless_supplied() {
        let a = EvaluationContext::build("Contract", "afspraak", &ValidateOptions::default()).unwrap();
        let b = EvaluationContext::build("Contract", "afspraak", &ValidateOptions::default()).unwrap();
        assert_ne!(a.correlation_id(), b.correlation_id());
        assert!(Uuid::parse_str(a.correlation_id()).is_ok());

        let opts = ValidateOptions::default().with_correlation_id("req-42");
        let c = EvaluationContext::build("Contract", "afspraak", &opts).unwrap();
        assert_eq!(c.correlation_id(), "req-42");
    }

    #[test]
    fn options_from_item_carry_locale_and_metadata() {
        let item = DefinitionItem::new("Contract", "afspraak")
            .with_locale("nl")
            .with_metadata("source", "test");
        let opts = ValidateOptions::from(&item);
        let ctx = EvaluationContext::build(&item.term, &item.text, &opts).unwrap();
        assert_eq!(ctx.locale(), Some("nl"));
        assert_eq!(ctx.metadata().get("source").map(String::as_str), Some("test"));
    }

    #[test]
    fn tokenize_keeps_inner_punctuation() {
        assert_eq!(tokenize("E-mail, o.a. -- post."), ["e-mail", "o.a", "post"]);
    }
}
