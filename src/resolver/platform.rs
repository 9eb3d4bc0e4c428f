//! SDK platform and minimum OS resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::platform::{ApplePlatform, Architecture, PlatformType};
use crate::core::version::DottedVersion;
use crate::resolver::errors::ConfigError;

/// Explicit version values supplied by the configuration layer.
///
/// A present entry always wins over the corresponding default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionOverrides {
    /// Xcode version to build with
    pub xcode_version: Option<DottedVersion>,
    /// SDK version per platform family
    pub sdk_version: BTreeMap<PlatformType, DottedVersion>,
    /// Minimum OS version per platform family
    pub minimum_os: BTreeMap<PlatformType, DottedVersion>,
}

impl VersionOverrides {
    /// Merge another set of overrides into this one (other takes precedence).
    pub fn merge(&mut self, other: VersionOverrides) {
        if other.xcode_version.is_some() {
            self.xcode_version = other.xcode_version;
        }
        self.sdk_version.extend(other.sdk_version);
        self.minimum_os.extend(other.minimum_os);
    }

    /// Explicit SDK version for a platform family, if any.
    pub fn sdk_version_for(&self, platform_type: PlatformType) -> Option<&DottedVersion> {
        self.sdk_version.get(&platform_type)
    }

    /// Explicit minimum OS version for a platform family, if any.
    pub fn minimum_os_for(&self, platform_type: PlatformType) -> Option<&DottedVersion> {
        self.minimum_os.get(&platform_type)
    }
}

/// The platform half of one architecture's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformSpec {
    /// SDK platform the architecture builds against
    pub sdk_platform: ApplePlatform,
    /// Minimum OS version to target
    pub minimum_os: DottedVersion,
}

/// Resolve the SDK platform and minimum OS for one architecture.
///
/// Only the override for `platform_type` is consulted; overrides given for
/// other families in the same build never leak in.
pub fn resolve_platform_spec(
    platform_type: PlatformType,
    arch: &Architecture,
    overrides: &VersionOverrides,
) -> Result<PlatformSpec, ConfigError> {
    let sdk_platform = platform_type.sdk_platform(arch)?;
    let minimum_os = overrides
        .minimum_os_for(platform_type)
        .cloned()
        .unwrap_or_else(|| platform_type.default_version());

    Ok(PlatformSpec {
        sdk_platform,
        minimum_os,
    })
}
