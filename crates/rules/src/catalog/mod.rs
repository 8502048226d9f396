//! Read-only rule catalog.
//!
//! A [`Catalog`] is built once from loaded documents, validated in full, and
//! never mutated afterwards. Readers share it through an `Arc`; a reload
//! builds a new catalog and swaps the pointer (see [`CatalogHandle`]), so an
//! evaluation that already holds a snapshot keeps seeing the old rules.

mod fuzzy;
mod handle;


pub use handle::CatalogHandle;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use definitie_core::Category;

use crate::checks::{CheckEntry, CheckError, CheckRegistry, Prepared};
use crate::loader::{ConfigError, LoadedDocuments, Result};
use crate::schema::{CheckParams, RuleSpec, Thresholds};

use fuzzy::fuzzy_match;

// ── Rule definition ─────────────────────────────────────────────────

/// A validated rule, as held by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub code: String,
    pub category: Category,
    pub weight: f64,
    pub priority: i32,
    pub explanation: String,
    /// Registry id of the check implementation.
    pub check: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "CheckParams::is_empty")]
    pub params: CheckParams,
    /// Set by the catalog for checks that compile their parameters.
    #[serde(skip)]
    pub prepared: Option<Prepared>,
}

impl RuleDefinition {
    /// An enabled rule with weight 1 and priority 0.
    pub fn new(code: impl Into<String>, category: Category, check: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            category,
            weight: 1.0,
            priority: 0,
            explanation: String::new(),
            check: check.into(),
            enabled: true,
            params: CheckParams::new(),
            prepared: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_params(mut self, params: CheckParams) -> Self {
        self.params = params;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Weight-zero rules are reported but do not count toward the category score.
    pub fn is_advisory(&self) -> bool {
        self.weight == 0.0
    }

    fn sort_key(&self) -> (Category, i32, &str) {
        (self.category, self.priority, self.code.as_str())
    }
}

impl From<&RuleSpec> for RuleDefinition {
    fn from(spec: &RuleSpec) -> Self {
        Self {
            code: spec.code.clone(),
            category: spec.category,
            weight: spec.weight,
            priority: spec.priority,
            explanation: spec.explanation.clone(),
            check: spec.check.clone(),
            enabled: spec.enabled,
            params: spec.params.clone(),
            prepared: None,
        }
    }
}

// ── Catalog ─────────────────────────────────────────────────────────

/// How strictly load failures are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Refuse to build when any source failed, instead of running degraded.
    pub strict: bool,
}

/// Why a catalog runs with reduced coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegradedMode {
    /// Sources that failed to load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<String>,
    pub reasons: Vec<String>,
}

/// Immutable, validated set of rules plus scoring thresholds.
#[derive(Debug)]
pub struct Catalog {
    /// All rules, disabled ones included, ordered by (category, priority, code).
    rules: Vec<RuleDefinition>,
    thresholds: Thresholds,
    degraded: Option<DegradedMode>,
    registry: Arc<CheckRegistry>,
    generation: u64,
}

impl Catalog {
    /// Validate `loaded` against `registry` and build a catalog.
    ///
    /// Fails on duplicate codes, negative weights, unknown checks, check
    /// parameters of the wrong kind or with out-of-range values, a missing or invalid thresholds document, or when no rule
    /// set loaded at all. Sources that failed to load make the catalog
    /// degraded, or fail the build when `options.strict` is set.
    pub fn build(
        loaded: &LoadedDocuments,
        registry: Arc<CheckRegistry>,
        options: &CatalogOptions,
        generation: u64,
    ) -> Result<Self> {
        let failed_sources = loaded.failed_sources();
        if options.strict && !failed_sources.is_empty() {
            return Err(ConfigError::StrictLoad {
                failures: failed_sources,
            });
        }

        let thresholds = select_thresholds(loaded)?;
        validate_thresholds(&thresholds)?;

        let rule_sets: Vec<_> = loaded
            .documents
            .iter()
            .filter_map(|d| d.document.as_rule_set().map(|rs| (d.origin.as_str(), rs)))
            .collect();
        if rule_sets.is_empty() {
            return Err(ConfigError::NoRuleSources);
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        let mut rules = Vec::new();
        for &(origin, rule_set) in &rule_sets {
            for spec in &rule_set.spec.rules {
                if let Some(first) = seen.insert(spec.code.as_str(), origin) {
                    return Err(ConfigError::DuplicateCode {
                        code: spec.code.clone(),
                        first: first.to_string(),
                        second: origin.to_string(),
                    });
                }
                let prepared = validate_rule(spec, &registry)?;
                rules.push(RuleDefinition {
                    prepared,
                    ..RuleDefinition::from(spec)
                });
            }
        }
        rules.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut reasons = Vec::new();
        if !failed_sources.is_empty() {
            reasons.push(format!(
                "{} rule source(s) failed to load",
                failed_sources.len()
            ));
        }
        if thresholds.weights().values().sum::<f64>() == 0.0 {
            reasons.push("category weights sum to zero".to_string());
        }
        let degraded = (!reasons.is_empty()).then(|| DegradedMode {
            failed_sources,
            reasons,
        });

        let catalog = Self {
            rules,
            thresholds,
            degraded,
            registry,
            generation,
        };

        info!(
            generation,
            rules = catalog.len(),
            enabled = catalog.enabled_rules().count(),
            rule_sets = rule_sets.len(),
            "rule catalog built"
        );
        if let Some(d) = &catalog.degraded {
            warn!(
                reasons = ?d.reasons,
                failed_sources = ?d.failed_sources,
                "rule catalog running in degraded mode"
            );
        }

        Ok(catalog)
    }

    /// Enabled rules in the given categories, ordered by (category, priority, code).
    pub fn rules_for(&self, categories: &[Category]) -> Vec<&RuleDefinition> {
        self.enabled_rules()
            .filter(|r| categories.contains(&r.category))
            .collect()
    }

    /// Every enabled rule, in evaluation order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn rule(&self, code: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.code == code)
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn degraded(&self) -> Option<&DegradedMode> {
        self.degraded.as_ref()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Incremented on every successful reload; the first build is 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of rules, disabled ones included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ── Validation ──────────────────────────────────────────────────────

fn select_thresholds(loaded: &LoadedDocuments) -> Result<Thresholds> {
    let mut found = loaded
        .documents
        .iter()
        .filter_map(|d| d.document.as_thresholds().map(|t| (d.origin.as_str(), t)));

    let Some((first, doc)) = found.next() else {
        return Err(ConfigError::MissingThresholds);
    };
    if let Some((second, _)) = found.next() {
        return Err(ConfigError::DuplicateThresholds {
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    Ok(doc.spec.clone())
}

fn unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn validate_thresholds(thresholds: &Thresholds) -> Result<()> {
    if !unit_interval(thresholds.overall) {
        return Err(ConfigError::InvalidThreshold(format!(
            "overall threshold {} is outside [0, 1]",
            thresholds.overall
        )));
    }

    for category in Category::ALL {
        let Some(entry) = thresholds.categories.get(&category) else {
            return Err(ConfigError::MissingCategory(category));
        };
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(ConfigError::InvalidThreshold(format!(
                "weight {} for category '{}' must be a finite number >= 0",
                entry.weight, category
            )));
        }
        if let Some(min) = entry.minimum {
            if !unit_interval(min) {
                return Err(ConfigError::InvalidThreshold(format!(
                    "minimum {} for category '{}' is outside [0, 1]",
                    min, category
                )));
            }
        }
    }
    Ok(())
}

fn validate_rule(spec: &RuleSpec, registry: &CheckRegistry) -> Result<Option<Prepared>> {
    if !spec.weight.is_finite() || spec.weight < 0.0 {
        return Err(ConfigError::NegativeWeight {
            code: spec.code.clone(),
            weight: spec.weight,
        });
    }

    let Some(entry) = registry.get(&spec.check) else {
        return Err(ConfigError::UnknownCheck {
            code: spec.code.clone(),
            check: spec.check.clone(),
            suggestion: fuzzy_match(&spec.check, &registry.ids()).map(str::to_string),
        });
    };

    validate_params(spec, entry)?;

    match entry.prepare {
        Some(prepare) => prepare(&spec.params).map_err(|e| param_error(&spec.code, e)),
        None => Ok(None),
    }
}

fn param_error(code: &str, err: CheckError) -> ConfigError {
    let (param, message) = match err {
        CheckError::MissingParam { param } => (param, "is required but missing".to_string()),
        CheckError::InvalidParam { param, message } => (param, message),
        CheckError::Failed(message) => ("*".to_string(), message),
    };
    ConfigError::InvalidParam {
        code: code.to_string(),
        param,
        message,
    }
}

fn validate_params(spec: &RuleSpec, entry: &CheckEntry) -> Result<()> {
    let invalid = |param: &str, message: String| ConfigError::InvalidParam {
        code: spec.code.clone(),
        param: param.to_string(),
        message,
    };

    for key in spec.params.keys() {
        if !entry.params.iter().any(|p| p.name == key) {
            return Err(invalid(
                key,
                format!("is not accepted by check '{}'", spec.check),
            ));
        }
    }

    for param in entry.params {
        match spec.params.get(param.name) {
            None if param.required => {
                return Err(invalid(param.name, "is required but missing".to_string()));
            }
            Some(value) if value.kind() != param.kind => {
                return Err(invalid(
                    param.name,
                    format!("must be a {}, got {}", param.kind, value.kind()),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}
