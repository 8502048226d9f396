use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate definition as supplied by the upstream generation pipeline.
///
/// The engine treats `text` as opaque beyond whitespace/case normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefinitionItem {
    pub term: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Caller-supplied correlation id. A fresh one is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DefinitionItem {
    pub fn new(term: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_item() {
        let item: DefinitionItem =
            serde_json::from_str(r#"{"term": "Contract", "text": "Een afspraak."}"#).unwrap();
        assert_eq!(item.term, "Contract");
        assert!(item.locale.is_none());
        assert!(item.correlation_id.is_none());
        assert!(item.metadata.is_empty());
    }

    #[test]
    fn builder_sets_optional_fields() {
        let item = DefinitionItem::new("Besluit", "Een schriftelijke beslissing.")
            .with_locale("nl-NL")
            .with_correlation_id("req-1")
            .with_metadata("source", "generator");
        assert_eq!(item.locale.as_deref(), Some("nl-NL"));
        assert_eq!(item.correlation_id.as_deref(), Some("req-1"));
        assert_eq!(item.metadata.get("source").map(String::as_str), Some("generator"));
    }
}
