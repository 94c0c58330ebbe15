//! Dual-format rule parsing.
//!
//! [`parse`] dispatches on the configuration's format version:
//! - V1: legacy statement files, keyed by file name
//! - V2: YAML group files, keyed by `<group name>;<file name>`
//!
//! Files are visited in ascending name order and the first error aborts
//! the whole configuration.
//!
//! The returned rules start with fresh alert state. Convert a parsed
//! configuration into live rules once per configuration version, not once
//! per evaluation, or pending alerts lose their history.

mod v1;
mod v2;


use std::collections::BTreeMap;

use tracing::debug;

use crate::configs::{RuleFormatVersion, RulesConfig};
use crate::error::{Result, RulesError};
use crate::rule::Rule;

/// Parsed rules keyed by group. Rules keep their source order.
pub type RuleGroups = BTreeMap<String, Vec<Rule>>;

/// Parse every rule file of `config` into rules.
pub fn parse(config: &RulesConfig) -> Result<RuleGroups> {
    debug!(
        format_version = %config.format_version,
        files = config.file_count(),
        "parsing rules config"
    );
    match config.format_version {
        RuleFormatVersion::V1 => v1::parse(config),
        RuleFormatVersion::V2 => v2::parse(config),
        other => Err(RulesError::InvalidFormatVersion(other.raw())),
    }
}
