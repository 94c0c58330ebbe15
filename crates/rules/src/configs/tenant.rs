use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RuleFormatVersion, RulesConfig};

/// A tenant's full configuration: rules plus alert routing.
///
/// Encoded through [`ConfigCompat`], which keeps the rules fields at the
/// top level of the object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigCompat", into = "ConfigCompat")]
pub struct Config {
    pub rules_config: RulesConfig,
    /// Raw alert routing configuration, opaque here.
    pub alertmanager_config: String,
}

impl Config {
    pub fn new(rules_config: RulesConfig, alertmanager_config: impl Into<String>) -> Self {
        Self {
            rules_config,
            alertmanager_config: alertmanager_config.into(),
        }
    }
}

/// Wire shape of [`Config`].
///
/// Records stored before format versions existed have only `rules_files`
/// and `alertmanager_config`; a missing or null `rule_format_version`
/// decodes as V1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigCompat {
    #[serde(default)]
    pub rules_files: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub rule_format_version: Option<RuleFormatVersion>,
    #[serde(default)]
    pub alertmanager_config: Option<String>,
}

impl From<ConfigCompat> for Config {
    fn from(compat: ConfigCompat) -> Self {
        Self {
            rules_config: RulesConfig {
                format_version: compat.rule_format_version.unwrap_or_default(),
                files: compat.rules_files,
            },
            alertmanager_config: compat.alertmanager_config.unwrap_or_default(),
        }
    }
}

impl From<Config> for ConfigCompat {
    fn from(config: Config) -> Self {
        Self {
            rules_files: config.rules_config.files,
            rule_format_version: Some(config.rules_config.format_version),
            alertmanager_config: Some(config.alertmanager_config),
        }
    }
}
