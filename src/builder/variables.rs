//! Build variables handed to compile and link command lines.
//!
//! A [`BuildVariableSet`] is the flat, fully resolved view of one
//! (platform type, architecture) pair. Downstream templating reads values by
//! well-known name and never resolves anything further.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::platform::{Architecture, PlatformType};
use crate::resolver::errors::LookupError;
use crate::resolver::platform::PlatformSpec;
use crate::resolver::xcode::ToolchainVersion;

/// Resolved Xcode version.
pub const XCODE_VERSION_OVERRIDE_VALUE: &str = "xcode_version_override_value";
/// Resolved SDK version.
pub const APPLE_SDK_VERSION_OVERRIDE_VALUE: &str = "apple_sdk_version_override_value";
/// SDK platform name, e.g. `iPhoneSimulator`.
pub const APPLE_SDK_PLATFORM_VALUE: &str = "apple_sdk_platform_value";
/// Minimum OS version.
pub const VERSION_MIN: &str = "version_min";
/// Platform family, e.g. `watchos`.
pub const APPLE_PLATFORM_TYPE: &str = "apple_platform_type";
/// CPU identifier, e.g. `armv7k`.
pub const APPLE_TARGET_CPU: &str = "apple_target_cpu";

/// Keys present in every variable set.
pub const REQUIRED_VARIABLES: [&str; 4] = [
    XCODE_VERSION_OVERRIDE_VALUE,
    APPLE_SDK_VERSION_OVERRIDE_VALUE,
    APPLE_SDK_PLATFORM_VALUE,
    VERSION_MIN,
];

/// Resolved variables for one architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVariableSet {
    platform_type: PlatformType,
    architecture: Architecture,
    #[serde(rename = "variables")]
    vars: BTreeMap<String, String>,
}

impl BuildVariableSet {
    /// Platform family this set was resolved for.
    pub fn platform_type(&self) -> PlatformType {
        self.platform_type
    }

    /// Architecture this set was resolved for.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Get a variable, or `None` if it is not defined.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Get a variable, reporting a missing one against `action`.
    pub fn lookup(&self, action: &str, name: &str) -> Result<&str, LookupError> {
        self.get(name).ok_or_else(|| LookupError::VariableNotFound {
            action: action.to_string(),
            name: name.to_string(),
        })
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Always false: every set carries the required variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Assemble the variable set for one architecture.
///
/// Copies each resolved field to its well-known name. No resolution happens
/// here.
pub fn assemble(
    platform: &PlatformSpec,
    toolchain: &ToolchainVersion,
    platform_type: PlatformType,
    arch: &Architecture,
) -> BuildVariableSet {
    let mut vars = BTreeMap::new();
    vars.insert(
        XCODE_VERSION_OVERRIDE_VALUE.to_string(),
        toolchain.xcode_version.to_string(),
    );
    vars.insert(
        APPLE_SDK_VERSION_OVERRIDE_VALUE.to_string(),
        toolchain.sdk_version.to_string(),
    );
    vars.insert(
        APPLE_SDK_PLATFORM_VALUE.to_string(),
        platform.sdk_platform.name_in_plist().to_string(),
    );
    vars.insert(VERSION_MIN.to_string(), platform.minimum_os.to_string());
    vars.insert(
        APPLE_PLATFORM_TYPE.to_string(),
        platform_type.as_str().to_string(),
    );
    vars.insert(APPLE_TARGET_CPU.to_string(), arch.cpu().to_string());

    BuildVariableSet {
        platform_type,
        architecture: arch.clone(),
        vars,
    }
}
