//! Dotted version strings.
//!
//! Toolchain, SDK and minimum OS versions are carried as opaque dotted
//! strings (`5.8`, `12.345`, `7.3.1`). They are validated once on entry and
//! then passed through untouched: no component is ever split off, padded or
//! merged with another version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resolver::errors::ConfigError;

/// A validated, atomic version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DottedVersion(String);

impl DottedVersion {
    /// Parse a version for the named configuration field.
    ///
    /// The field name is only used for the error message.
    pub fn parse_field(field: &str, value: &str) -> Result<Self, ConfigError> {
        if is_valid(value) {
            Ok(DottedVersion(value.to_string()))
        } else {
            Err(ConfigError::InvalidVersion {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Wrap a compiled-in version literal.
    pub(crate) fn builtin(raw: &'static str) -> Self {
        debug_assert!(is_valid(raw), "invalid built-in version {}", raw);
        DottedVersion(raw.to_string())
    }

    /// Get the version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphanumeric()))
}

impl FromStr for DottedVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DottedVersion::parse_field("version", s)
    }
}

impl TryFrom<String> for DottedVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DottedVersion> for String {
    fn from(v: DottedVersion) -> Self {
        v.0
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DottedVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
