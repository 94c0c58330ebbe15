//! Versioned per-tenant rules configuration.
//!
//! This crate provides:
//! - The configuration model (`RulesConfig`, tenant `Config`, `View`,
//!   `VersionedRulesConfig`) with its backward-compatible JSON shape
//! - A dual-format parser turning stored rule files (legacy statements or
//!   YAML groups) into alerting and recording rules
//! - Snapshot checking used by the `rules-check` binary

pub mod check;
pub mod configs;
pub mod error;
pub mod parse;
pub mod rule;

pub use configs::{Config, ConfigCompat, RuleFormatVersion, RulesConfig, VersionedRulesConfig, View};
pub use error::{FileError, FormatVersionError, Result, RulesError};
pub use parse::RuleGroups;
pub use rule::{AlertingRule, RecordingRule, Rule, RuleKind};
pub use vigil_core::ConfigId;
