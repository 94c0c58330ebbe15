//! Checking stored configuration snapshots.
//!
//! Loads views from a JSON file (a single [`View`] or a configs listing
//! `{"configs": {"<tenant>": View}}`) and parses each tenant's rules.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vigil_core::ConfigId;

use crate::configs::View;
use crate::rule::RuleKind;

/// Tenant name used when the input is a single view.
pub const SINGLE_VIEW_TENANT: &str = "default";

/// Top-level keys of a single view document.
const VIEW_FIELDS: &[&str] = &["id", "config", "deleted_at"];

/// The configs store listing: every tenant's current view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigsResponse {
    pub configs: BTreeMap<String, View>,
}

/// Read views keyed by tenant.
///
/// A document with a `configs` key is a listing, anything else must be a
/// single view. Errors inside either shape are reported as they are.
pub fn load_views(path: &Path) -> vigil_core::Result<BTreeMap<String, View>> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let views = if value.get("configs").is_some() {
        serde_json::from_value::<ConfigsResponse>(value)?.configs
    } else {
        if let Some(key) = value
            .as_object()
            .and_then(|obj| obj.keys().find(|k| !VIEW_FIELDS.contains(&k.as_str())))
        {
            let msg = format!("unknown field `{}`, expected one of {:?}", key, VIEW_FIELDS);
            return Err(<serde_json::Error as serde::de::Error>::custom(msg).into());
        }
        let view: View = serde_json::from_value(value)?;
        BTreeMap::from([(SINGLE_VIEW_TENANT.to_string(), view)])
    };
    info!(path = %path.display(), tenants = views.len(), "loaded configs");
    Ok(views)
}

// ── Reports ─────────────────────────────────────────────────────────

/// Rule counts of one parsed group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub alerting: usize,
    pub recording: usize,
}

/// Outcome of checking one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TenantStatus {
    /// Deleted and skipped.
    Deleted,
    /// The rules file mapping is unset.
    NoRules,
    Parsed { groups: BTreeMap<String, GroupSummary> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantReport {
    pub tenant: String,
    pub id: ConfigId,
    pub format_version: String,
    #[serde(flatten)]
    pub status: TenantStatus,
}

impl TenantReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TenantStatus::Failed { .. })
    }
}

/// Parse one tenant's rules and summarise the result.
pub fn check_view(tenant: &str, view: &View, skip_deleted: bool) -> TenantReport {
    let status = if skip_deleted && view.is_deleted() {
        TenantStatus::Deleted
    } else {
        match view.versioned_rules_config() {
            None => TenantStatus::NoRules,
            Some(versioned) => match versioned.config.parse() {
                Ok(groups) => TenantStatus::Parsed {
                    groups: groups
                        .iter()
                        .map(|(key, rules)| {
                            let mut summary = GroupSummary::default();
                            for rule in rules {
                                match rule.kind() {
                                    RuleKind::Alerting => summary.alerting += 1,
                                    RuleKind::Recording => summary.recording += 1,
                                }
                            }
                            (key.clone(), summary)
                        })
                        .collect(),
                },
                Err(e) => TenantStatus::Failed { error: e.to_string() },
            },
        }
    };

    debug!(tenant, id = %view.id, "checked tenant config");
    TenantReport {
        tenant: tenant.to_string(),
        id: view.id,
        format_version: view.config.rules_config.format_version.to_string(),
        status,
    }
}

/// Check every tenant, in tenant name order.
pub fn check_all(views: &BTreeMap<String, View>, skip_deleted: bool) -> Vec<TenantReport> {
    views
        .iter()
        .map(|(tenant, view)| check_view(tenant, view, skip_deleted))
        .collect()
}
