//! Rule format version tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatVersionError;

/// Which rule-file grammar a configuration uses.
///
/// Encoded on the wire as the string tokens `"1"` and `"2"`. The default
/// (zero) value is [`RuleFormatVersion::V1`], so records written before the
/// tag existed decode as legacy files. Values outside V1/V2 can exist in
/// memory but fail to encode and fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RuleFormatVersion(u8);

impl RuleFormatVersion {
    /// Legacy statement files (`ALERT ... IF ...`).
    pub const V1: Self = Self(0);
    /// YAML rule group files.
    pub const V2: Self = Self(1);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self == Self::V1 || self == Self::V2
    }

    /// The wire token for this version.
    pub fn encode(self) -> Result<&'static str, FormatVersionError> {
        match self {
            Self::V1 => Ok("1"),
            Self::V2 => Ok("2"),
            other => Err(FormatVersionError::Encode(other.0)),
        }
    }

    pub fn decode(token: &str) -> Result<Self, FormatVersionError> {
        match token {
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            other => Err(FormatVersionError::Decode(other.to_string())),
        }
    }
}

impl fmt::Display for RuleFormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Ok(token) => write!(f, "v{}", token),
            Err(_) => write!(f, "unknown({})", self.0),
        }
    }
}

impl FromStr for RuleFormatVersion {
    type Err = FormatVersionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for RuleFormatVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let token = self.encode().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(token)
    }
}

impl<'de> Deserialize<'de> for RuleFormatVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::decode(&token).map_err(serde::de::Error::custom)
    }
}
