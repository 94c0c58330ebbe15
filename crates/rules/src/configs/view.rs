use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::ConfigId;

use super::{Config, RulesConfig};

/// One version of a tenant's configuration as returned by the configs store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(default)]
    pub id: ConfigId,
    #[serde(default)]
    pub config: Config,
    /// `None` while the configuration is live.
    #[serde(default, with = "deleted_at")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl View {
    /// Project the view onto its rules configuration.
    ///
    /// Returns `None` when the tenant has no rules configuration yet (the
    /// file mapping is unset), as opposed to an empty one.
    pub fn versioned_rules_config(&self) -> Option<VersionedRulesConfig> {
        if !self.config.rules_config.has_files() {
            return None;
        }
        Some(VersionedRulesConfig {
            id: self.id,
            config: self.config.rules_config.clone(),
            deleted_at: self.deleted_at,
        })
    }

    pub fn is_deleted(&self) -> bool {
        deleted_at::is_set(self.deleted_at)
    }
}

/// A rules configuration together with its version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRulesConfig {
    #[serde(default)]
    pub id: ConfigId,
    #[serde(default)]
    pub config: RulesConfig,
    #[serde(default, with = "deleted_at")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VersionedRulesConfig {
    /// A configuration is deleted as soon as it carries a non-zero deletion time.
    pub fn is_deleted(&self) -> bool {
        deleted_at::is_set(self.deleted_at)
    }
}

/// Serde adapter for deletion timestamps.
///
/// "Not deleted" is written as the zero instant `0001-01-01T00:00:00Z`.
/// A missing field, `null` and the zero instant all read back as `None`.
pub mod deleted_at {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Unix seconds of `0001-01-01T00:00:00Z`.
    const ZERO_UNIX_SECS: i64 = -62_135_596_800;

    pub const ZERO: &str = "0001-01-01T00:00:00Z";

    pub fn is_zero(t: &DateTime<Utc>) -> bool {
        t.timestamp() == ZERO_UNIX_SECS && t.timestamp_subsec_nanos() == 0
    }

    pub(crate) fn is_set(t: Option<DateTime<Utc>>) -> bool {
        t.is_some_and(|t| !is_zero(&t))
    }

    pub fn serialize<S: Serializer>(
        t: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) if !is_zero(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            _ => serializer.serialize_str(ZERO),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let t = Option::<DateTime<Utc>>::deserialize(deserializer)?;
        Ok(t.filter(|t| !is_zero(t)))
    }
}
