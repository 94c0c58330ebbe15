use serde::{Deserialize, Serialize};

/// Version identifier of a single tenant's configuration.
///
/// The configs store mints a new ID whenever any part of a tenant's
/// configuration changes and guarantees that later versions have greater
/// IDs. IDs are never reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(pub i64);

impl ConfigId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Whether `self` supersedes `other` for the same tenant.
    pub fn is_newer_than(self, other: ConfigId) -> bool {
        self.0 > other.0
    }
}

impl From<i64> for ConfigId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_ordered_by_version() {
        let first = ConfigId::new(3);
        let second = ConfigId::from(7);
        assert!(second.is_newer_than(first));
        assert!(!first.is_newer_than(second));
        assert!(!first.is_newer_than(first));
        assert!(first < second);
    }

    #[test]
    fn id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ConfigId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: ConfigId = serde_json::from_str("42").unwrap();
        assert_eq!(back.get(), 42);
    }
}
