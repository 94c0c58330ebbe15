use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Read a profiled value: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt(
    lookup: &impl Fn(&str) -> Option<String>,
    profile: &str,
    key: &str,
) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    lookup(key).filter(|s| !s.is_empty())
}

fn profiled_or(
    lookup: &impl Fn(&str) -> Option<String>,
    profile: &str,
    key: &str,
    default: &str,
) -> String {
    profiled_opt(lookup, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    profile: &str,
    key: &str,
    default: bool,
) -> Result<bool> {
    let Some(raw) = profiled_opt(lookup, profile, key) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::InvalidEnv {
            key: key.to_string(),
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub log: LogConfig,
    pub check: CheckConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VIGIL_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self> {
        let profile = env::var("VIGIL_PROFILE").unwrap_or_default();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self> {
        Self::from_lookup(profile, |key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(profile: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let p = profile.to_uppercase();
        Ok(Self {
            log: LogConfig::from_lookup(&lookup, &p),
            check: CheckConfig::from_lookup(&lookup, &p)?,
            profile: p,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  log:    filter={}", self.log.filter);
        tracing::info!(
            "  check:  configs_file={}, skip_deleted={}",
            self.check
                .configs_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            self.check.skip_deleted
        );
    }
}

// ── Logging ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl LogConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, p: &str) -> Self {
        Self {
            filter: profiled_or(lookup, p, "VIGIL_LOG", "info"),
        }
    }
}

// ── Rule checking ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Default configs snapshot to check.
    pub configs_file: Option<PathBuf>,
    /// Deleted tenant configurations are not parsed.
    pub skip_deleted: bool,
}

impl CheckConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, p: &str) -> Result<Self> {
        Ok(Self {
            configs_file: profiled_opt(lookup, p, "VIGIL_CONFIGS_FILE").map(PathBuf::from),
            skip_deleted: profiled_bool(lookup, p, "VIGIL_SKIP_DELETED", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup("", lookup(&[])).unwrap();
        assert_eq!(cfg.profile_label(), "default");
        assert_eq!(cfg.log.filter, "info");
        assert!(cfg.check.configs_file.is_none());
        assert!(cfg.check.skip_deleted);
    }

    #[test]
    fn profile_prefixed_keys_win() {
        let cfg = Config::from_lookup(
            "prod",
            lookup(&[
                ("VIGIL_LOG", "debug"),
                ("PROD_VIGIL_LOG", "warn"),
                ("VIGIL_CONFIGS_FILE", "configs.json"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.profile, "PROD");
        assert_eq!(cfg.log.filter, "warn");
        assert_eq!(cfg.check.configs_file, Some(PathBuf::from("configs.json")));
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let err = Config::from_lookup("", lookup(&[("VIGIL_SKIP_DELETED", "maybe")])).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidEnv { ref key, .. } if key == "VIGIL_SKIP_DELETED")
        );
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        let cfg = Config::from_lookup("", lookup(&[("VIGIL_SKIP_DELETED", "off")])).unwrap();
        assert!(!cfg.check.skip_deleted);
    }
}
