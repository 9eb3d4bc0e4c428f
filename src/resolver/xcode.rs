//! Xcode and SDK version resolution.
//!
//! The version table is the read-only view of what toolchain discovery
//! found: a default Xcode, the known Xcode versions with the SDK each one
//! ships per platform, and table-wide SDK fallbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformType;
use crate::core::version::DottedVersion;
use crate::resolver::errors::ConfigError;

/// Built-in default Xcode version.
pub const DEFAULT_XCODE_VERSION: &str = "7.3.1";

/// One installed Xcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XcodeVersionEntry {
    /// Canonical version
    pub version: DottedVersion,
    /// Other spellings that select this Xcode (e.g. `7.3` for `7.3.1`)
    #[serde(default)]
    pub aliases: Vec<DottedVersion>,
    /// SDK version shipped per platform family
    #[serde(default)]
    pub sdk_defaults: BTreeMap<PlatformType, DottedVersion>,
}

impl XcodeVersionEntry {
    fn matches(&self, version: &DottedVersion) -> bool {
        &self.version == version || self.aliases.contains(version)
    }
}

/// Default version table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcodeVersionTable {
    /// Xcode used when none is requested
    pub default_version: Option<DottedVersion>,
    /// Known Xcode versions
    pub versions: Vec<XcodeVersionEntry>,
    /// SDK fallbacks for Xcode versions without an entry
    pub sdk_defaults: BTreeMap<PlatformType, DottedVersion>,
}

impl XcodeVersionTable {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        let sdk_defaults: BTreeMap<_, _> = PlatformType::ALL
            .iter()
            .map(|p| (*p, p.default_version()))
            .collect();
        let default = DottedVersion::builtin(DEFAULT_XCODE_VERSION);

        XcodeVersionTable {
            default_version: Some(default.clone()),
            versions: vec![XcodeVersionEntry {
                version: default,
                aliases: Vec::new(),
                sdk_defaults: sdk_defaults.clone(),
            }],
            sdk_defaults,
        }
    }

    /// Find the entry for a version or alias.
    pub fn entry(&self, version: &DottedVersion) -> Option<&XcodeVersionEntry> {
        self.versions.iter().find(|e| e.matches(version))
    }

    /// Merge another table into this one (other takes precedence).
    ///
    /// Entries for the same canonical version are replaced wholesale.
    pub fn merge(&mut self, other: XcodeVersionTable) {
        if other.default_version.is_some() {
            self.default_version = other.default_version;
        }
        for entry in other.versions {
            self.versions.retain(|e| e.version != entry.version);
            self.versions.push(entry);
        }
        self.sdk_defaults.extend(other.sdk_defaults);
    }
}

/// Resolved toolchain versions for one platform family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolchainVersion {
    pub xcode_version: DottedVersion,
    pub sdk_version: DottedVersion,
}

/// Resolves Xcode and SDK versions against a version table.
#[derive(Debug, Clone, Copy)]
pub struct XcodeResolver<'a> {
    table: &'a XcodeVersionTable,
}

impl<'a> XcodeResolver<'a> {
    /// Create a resolver over a version table.
    pub fn new(table: &'a XcodeVersionTable) -> Self {
        XcodeResolver { table }
    }

    /// Resolve the Xcode and SDK versions for a platform family.
    ///
    /// Explicit values are used as given. Otherwise the Xcode falls back to
    /// the table default, and the SDK falls back first to what the resolved
    /// Xcode ships and then to the table-wide default.
    pub fn resolve(
        &self,
        explicit_xcode: Option<&DottedVersion>,
        explicit_sdk: Option<&DottedVersion>,
        platform_type: PlatformType,
    ) -> Result<ToolchainVersion, ConfigError> {
        let xcode_version = explicit_xcode
            .or(self.table.default_version.as_ref())
            .cloned()
            .ok_or_else(|| ConfigError::MissingDefault {
                field: "xcode_version".to_string(),
                platform_type,
            })?;

        let sdk_version = match explicit_sdk {
            Some(v) => v.clone(),
            None => self
                .table
                .entry(&xcode_version)
                .and_then(|e| e.sdk_defaults.get(&platform_type))
                .or_else(|| self.table.sdk_defaults.get(&platform_type))
                .cloned()
                .ok_or_else(|| ConfigError::MissingDefault {
                    field: "sdk_version".to_string(),
                    platform_type,
                })?,
        };

        tracing::debug!(
            "resolved xcode {} / {} sdk {}",
            xcode_version,
            platform_type,
            sdk_version
        );

        Ok(ToolchainVersion {
            xcode_version,
            sdk_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> DottedVersion {
        s.parse().unwrap()
    }

    fn table() -> XcodeVersionTable {
        let mut table = XcodeVersionTable::builtin();
        let mut sdks = BTreeMap::new();
        sdks.insert(PlatformType::Ios, v("9.3"));
        table.versions.push(XcodeVersionEntry {
            version: v("7.3"),
            aliases: vec![v("7")],
            sdk_defaults: sdks,
        });
        table
    }

    #[test]
    fn test_defaults_when_nothing_explicit() {
        let table = table();
        let resolved = XcodeResolver::new(&table)
            .resolve(None, None, PlatformType::Ios)
            .unwrap();
        assert_eq!(resolved.xcode_version.as_str(), DEFAULT_XCODE_VERSION);
        assert_eq!(resolved.sdk_version.as_str(), "8.4");
    }

    #[test]
    fn test_explicit_values_win() {
        let table = table();
        let resolved = XcodeResolver::new(&table)
            .resolve(Some(&v("5.8")), Some(&v("10.1")), PlatformType::Watchos)
            .unwrap();
        assert_eq!(resolved.xcode_version.as_str(), "5.8");
        assert_eq!(resolved.sdk_version.as_str(), "10.1");
    }

    #[test]
    fn test_unknown_xcode_uses_table_sdk_fallback() {
        let table = table();
        let resolver = XcodeResolver::new(&table);
        let ios = resolver.resolve(Some(&v("5.8")), None, PlatformType::Ios).unwrap();
        let watch = resolver
            .resolve(Some(&v("5.8")), None, PlatformType::Watchos)
            .unwrap();
        assert_eq!(ios.sdk_version.as_str(), "8.4");
        assert_eq!(watch.sdk_version.as_str(), "2.0");
    }

    #[test]
    fn test_xcode_entry_sdk_selected_by_alias() {
        let table = table();
        let resolver = XcodeResolver::new(&table);
        let resolved = resolver.resolve(Some(&v("7")), None, PlatformType::Ios).unwrap();
        // The alias is kept verbatim; only the SDK lookup goes through the entry.
        assert_eq!(resolved.xcode_version.as_str(), "7");
        assert_eq!(resolved.sdk_version.as_str(), "9.3");

        // An entry without a value for the platform falls through to the table.
        let tv = resolver.resolve(Some(&v("7.3")), None, PlatformType::Tvos).unwrap();
        assert_eq!(tv.sdk_version.as_str(), "9.0");
    }

    #[test]
    fn test_missing_defaults_fail() {
        let empty = XcodeVersionTable::default();
        let resolver = XcodeResolver::new(&empty);

        let err = resolver.resolve(None, None, PlatformType::Ios).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefault { ref field, .. } if field == "xcode_version"));

        let err = resolver
            .resolve(Some(&v("15.0")), None, PlatformType::Visionos)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDefault {
                field: "sdk_version".to_string(),
                platform_type: PlatformType::Visionos,
            }
        );

        // An explicit SDK needs no table at all.
        assert!(resolver
            .resolve(Some(&v("15.0")), Some(&v("1.0")), PlatformType::Visionos)
            .is_ok());
    }

    #[test]
    fn test_table_merge() {
        let mut base = XcodeVersionTable::builtin();
        let mut other = XcodeVersionTable::default();
        other.default_version = Some(v("15.2"));
        other.sdk_defaults.insert(PlatformType::Ios, v("17.2"));
        other.versions.push(XcodeVersionEntry {
            version: v(DEFAULT_XCODE_VERSION),
            aliases: vec![v("7.3")],
            sdk_defaults: BTreeMap::new(),
        });

        base.merge(other);

        assert_eq!(base.default_version, Some(v("15.2")));
        assert_eq!(base.sdk_defaults.get(&PlatformType::Ios), Some(&v("17.2")));
        assert_eq!(base.sdk_defaults.get(&PlatformType::Tvos), Some(&v("9.0")));
        assert_eq!(base.versions.len(), 1);
        assert!(base.entry(&v("7.3")).is_some());
    }
}
