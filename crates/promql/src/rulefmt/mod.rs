//! Group-based YAML rule files.
//!
//! ```yaml
//! groups:
//!   - name: example
//!     interval: 1m
//!     rules:
//!       - record: job:http_requests:rate5m
//!         expr: sum by (job) (rate(http_requests_total[5m]))
//!       - alert: HighErrorRate
//!         expr: job:http_errors:ratio5m > 0.05
//!         for: 10m
//!         labels: { severity: page }
//! ```
//!
//! [`parse`] checks structure only. Expressions are kept as text and are
//! parsed by the caller.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::duration::{format_duration, parse_duration};
use crate::labels::{is_valid_label_name, is_valid_metric_name};

// ── Errors ──────────────────────────────────────────────────────────

/// A structural problem in a rule file.
#[derive(Debug, thiserror::Error)]
pub enum RuleFileError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("groupname: \"{0}\" is repeated in the same file")]
    DuplicateGroup(String),

    /// `index` is 1-based, `rule` is the record or alert name (may be empty).
    #[error("group \"{group}\", rule {index}, \"{rule}\": {reason}")]
    Rule {
        group: String,
        index: usize,
        rule: String,
        reason: String,
    },
}

// ── Document types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroups {
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleGroup {
    pub name: String,
    /// Evaluation interval override for this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<RuleDuration>,
    #[serde(default)]
    pub rules: Vec<RuleNode>,
}

/// One entry of a group's `rules` list: either a recording rule or an alert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(default)]
    pub expr: String,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<RuleDuration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl RuleNode {
    /// The alert or record name, whichever is set.
    pub fn name(&self) -> &str {
        self.alert
            .as_deref()
            .or(self.record.as_deref())
            .unwrap_or_default()
    }

    /// How long an alert condition must hold before firing (zero when unset).
    pub fn hold_duration(&self) -> Duration {
        self.hold.map(|d| d.0).unwrap_or_default()
    }

    fn validate(&self) -> Vec<String> {
        let mut reasons = Vec::new();

        match (&self.record, &self.alert) {
            (Some(_), Some(_)) => {
                reasons.push("only one of 'record' and 'alert' must be set".to_string())
            }
            (None, None) => reasons.push("one of 'record' or 'alert' must be set".to_string()),
            (None, Some(alert)) if alert.is_empty() => {
                reasons.push("field 'alert' must not be empty".to_string())
            }
            _ => {}
        }

        if self.expr.trim().is_empty() {
            reasons.push("field 'expr' must be set in rule".to_string());
        }

        if let Some(record) = &self.record {
            if self.hold.is_some() {
                reasons.push("invalid field 'for' in recording rule".to_string());
            }
            if !self.annotations.is_empty() {
                reasons.push("invalid field 'annotations' in recording rule".to_string());
            }
            if !is_valid_metric_name(record) {
                reasons.push(format!("invalid recording rule name: {}", record));
            }
        }

        for name in self.labels.keys() {
            if !is_valid_label_name(name) {
                reasons.push(format!("invalid label name: {}", name));
            }
        }
        for name in self.annotations.keys() {
            if !is_valid_label_name(name) {
                reasons.push(format!("invalid annotation name: {}", name));
            }
        }

        reasons
    }
}

/// A duration written in the compact `1h30m` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleDuration(pub Duration);

impl fmt::Display for RuleDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for RuleDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for RuleDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw)
            .map(RuleDuration)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("not a valid duration string: \"{}\"", raw))
            })
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse and validate a rule file.
///
/// A YAML error is returned alone. Otherwise every structural problem in
/// the file is reported, in document order. The error list is never empty.
/// Blank content is an empty file.
pub fn parse(content: &str) -> Result<RuleGroups, Vec<RuleFileError>> {
    if content.trim().is_empty() {
        return Ok(RuleGroups::default());
    }

    let groups: RuleGroups =
        serde_yaml::from_str(content).map_err(|e| vec![RuleFileError::from(e)])?;
    let errors = groups.validate();
    if !errors.is_empty() {
        return Err(errors);
    }

    debug!(groups = groups.groups.len(), "parsed rule groups");
    Ok(groups)
}

impl RuleGroups {
    /// Collect every structural problem, without stopping at the first.
    pub fn validate(&self) -> Vec<RuleFileError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for group in &self.groups {
            if group.name.is_empty() {
                errors.push(RuleFileError::EmptyGroupName);
            } else if !seen.insert(group.name.as_str()) {
                errors.push(RuleFileError::DuplicateGroup(group.name.clone()));
            }

            for (i, node) in group.rules.iter().enumerate() {
                for reason in node.validate() {
                    errors.push(RuleFileError::Rule {
                        group: group.name.clone(),
                        index: i + 1,
                        rule: node.name().to_string(),
                        reason,
                    });
                }
            }
        }

        errors
    }
}
