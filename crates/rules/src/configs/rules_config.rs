use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RuleFormatVersion;
use crate::error::Result;
use crate::parse::{self, RuleGroups};

/// The rules configuration of one tenant: a format version plus the raw
/// content of each rule file, keyed by file name.
///
/// `files` is `None` when the tenant has never had a rules configuration,
/// which is distinct from a configuration with no files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub format_version: RuleFormatVersion,
    #[serde(default)]
    pub files: Option<BTreeMap<String, String>>,
}

impl RulesConfig {
    /// A configuration with the given files set.
    pub fn new<K, V>(
        format_version: RuleFormatVersion,
        files: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            format_version,
            files: Some(files.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Whether the file mapping is set (possibly empty).
    pub fn has_files(&self) -> bool {
        self.files.is_some()
    }

    /// Files in ascending name order. Empty when the mapping is unset.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .flatten()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn file_count(&self) -> usize {
        self.files.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.as_ref()?.get(name).map(String::as_str)
    }

    /// Parse every file with the grammar selected by `format_version`.
    pub fn parse(&self) -> Result<RuleGroups> {
        parse::parse(self)
    }
}

/// Equal when the format versions match and both hold the same
/// `(name, content)` pairs. An unset mapping equals an empty one.
impl PartialEq for RulesConfig {
    fn eq(&self, other: &Self) -> bool {
        self.format_version == other.format_version
            && self.file_count() == other.file_count()
            && self.files().all(|(name, content)| other.file(name) == Some(content))
    }
}

impl Eq for RulesConfig {}
