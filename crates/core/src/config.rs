use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn profiled_env_u64(profile: &str, key: &str) -> Option<u64> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Engine config ─────────────────────────────────────────────

/// Process-level settings for the validation engine.
///
/// Rule content and thresholds are not configured here; they live in the
/// YAML documents under [`rules_dir`](EngineConfig::rules_dir).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Directory scanned (recursively) for rule and threshold documents.
    pub rules_dir: PathBuf,
    /// Worker count for batch validation. Always at least 1.
    pub batch_concurrency: usize,
    /// Optional batch-level deadline in milliseconds.
    pub batch_timeout_ms: Option<u64>,
    /// Refuse to start when any rule source fails to load.
    pub strict_rules: bool,
    /// Hot-reload the catalog when rule files change.
    pub watch_rules: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            rules_dir: PathBuf::from("data/rules"),
            batch_concurrency: 1,
            batch_timeout_ms: None,
            strict_rules: false,
            watch_rules: false,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DEFINITIE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DEFINITIE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();
        Self {
            profile: p.to_string(),
            rules_dir: PathBuf::from(profiled_env_or(p, "RULES_DIR", "data/rules")),
            batch_concurrency: profiled_env_u64(p, "BATCH_CONCURRENCY")
                .map(|n| (n as usize).max(1))
                .unwrap_or(defaults.batch_concurrency),
            batch_timeout_ms: profiled_env_u64(p, "BATCH_TIMEOUT_MS").filter(|ms| *ms > 0),
            strict_rules: profiled_env_bool(p, "STRICT_RULES", defaults.strict_rules),
            watch_rules: profiled_env_bool(p, "WATCH_RULES", defaults.watch_rules),
        }
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_ms.map(Duration::from_millis)
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  rules:       dir={}, strict={}, watch={}", self.rules_dir.display(), self.strict_rules, self.watch_rules);
        tracing::info!(
            "  batch:       concurrency={}, timeout={}",
            self.batch_concurrency,
            self.batch_timeout_ms
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "(none)".to_string())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests use a unique profile prefix so they never collide with
    // each other or with the developer's shell.

    #[test]
    fn defaults_without_env() {
        let config = EngineConfig::for_profile("CFGTEST_EMPTY");
        assert_eq!(config.profile, "CFGTEST_EMPTY");
        assert_eq!(config.batch_concurrency, 1);
        assert!(config.batch_timeout().is_none());
    }

    #[test]
    fn profiled_keys_win_and_concurrency_is_clamped() {
        env::set_var("CFGTEST_A_BATCH_CONCURRENCY", "0");
        env::set_var("CFGTEST_A_BATCH_TIMEOUT_MS", "250");
        env::set_var("CFGTEST_A_STRICT_RULES", "true");
        env::set_var("CFGTEST_A_RULES_DIR", "/tmp/rules");

        let config = EngineConfig::for_profile("cfgtest_a");
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.batch_timeout(), Some(Duration::from_millis(250)));
        assert!(config.strict_rules);
        assert_eq!(config.rules_dir, PathBuf::from("/tmp/rules"));
        assert_eq!(config.profile_label(), "CFGTEST_A");
    }
}
