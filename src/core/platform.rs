//! Apple platform families, SDK platforms and CPU architectures.
//!
//! The set of platform families and the CPUs each one accepts are closed:
//! every lookup here is a total match over a finite domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::version::DottedVersion;
use crate::resolver::errors::ConfigError;

/// A family of Apple operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Ios,
    Watchos,
    Tvos,
    Macos,
    Visionos,
}

impl PlatformType {
    /// Every platform family.
    pub const ALL: [PlatformType; 5] = [
        PlatformType::Ios,
        PlatformType::Watchos,
        PlatformType::Tvos,
        PlatformType::Macos,
        PlatformType::Visionos,
    ];

    /// Get the platform type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Ios => "ios",
            PlatformType::Watchos => "watchos",
            PlatformType::Tvos => "tvos",
            PlatformType::Macos => "macos",
            PlatformType::Visionos => "visionos",
        }
    }

    /// Compiled-in default version for this family.
    ///
    /// Used as the minimum OS version when none is configured, and as the
    /// SDK version in the built-in version table.
    pub fn default_version(&self) -> DottedVersion {
        DottedVersion::builtin(match self {
            PlatformType::Ios => "8.4",
            PlatformType::Watchos => "2.0",
            PlatformType::Tvos => "9.0",
            PlatformType::Macos => "10.11",
            PlatformType::Visionos => "1.0",
        })
    }

    /// CPU used when a build names no CPU for this family.
    pub fn default_cpu(&self) -> &'static str {
        match self {
            PlatformType::Ios => "x86_64",
            PlatformType::Watchos => "i386",
            PlatformType::Tvos => "x86_64",
            PlatformType::Macos => "x86_64",
            PlatformType::Visionos => "sim_arm64",
        }
    }

    fn device_cpus(&self) -> &'static [&'static str] {
        match self {
            PlatformType::Ios => &["armv7", "arm64", "arm64e"],
            PlatformType::Watchos => &["armv7k", "arm64_32", "device_arm64", "device_arm64e"],
            PlatformType::Tvos => &["arm64"],
            PlatformType::Macos => &["x86_64", "arm64", "arm64e"],
            PlatformType::Visionos => &["arm64"],
        }
    }

    fn simulator_cpus(&self) -> &'static [&'static str] {
        match self {
            PlatformType::Ios => &["i386", "x86_64", "sim_arm64"],
            PlatformType::Watchos => &["i386", "x86_64", "arm64"],
            PlatformType::Tvos => &["x86_64", "sim_arm64"],
            PlatformType::Macos => &[],
            PlatformType::Visionos => &["sim_arm64"],
        }
    }

    /// All CPU identifiers recognized for this family.
    pub fn known_cpus(&self) -> Vec<&'static str> {
        let mut cpus = self.device_cpus().to_vec();
        cpus.extend_from_slice(self.simulator_cpus());
        cpus
    }

    /// Select the SDK platform for a CPU of this family.
    pub fn sdk_platform(&self, arch: &Architecture) -> Result<ApplePlatform, ConfigError> {
        let cpu = arch.cpu();
        let simulator = if self.simulator_cpus().contains(&cpu) {
            true
        } else if self.device_cpus().contains(&cpu) {
            false
        } else {
            return Err(ConfigError::UnsupportedArchitecture {
                platform_type: *self,
                cpu: cpu.to_string(),
            });
        };

        Ok(match (self, simulator) {
            (PlatformType::Ios, false) => ApplePlatform::IosDevice,
            (PlatformType::Ios, true) => ApplePlatform::IosSimulator,
            (PlatformType::Watchos, false) => ApplePlatform::WatchosDevice,
            (PlatformType::Watchos, true) => ApplePlatform::WatchosSimulator,
            (PlatformType::Tvos, false) => ApplePlatform::TvosDevice,
            (PlatformType::Tvos, true) => ApplePlatform::TvosSimulator,
            (PlatformType::Macos, _) => ApplePlatform::MacOs,
            (PlatformType::Visionos, false) => ApplePlatform::VisionosDevice,
            (PlatformType::Visionos, true) => ApplePlatform::VisionosSimulator,
        })
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(PlatformType::Ios),
            "watchos" => Ok(PlatformType::Watchos),
            "tvos" => Ok(PlatformType::Tvos),
            "macos" => Ok(PlatformType::Macos),
            "visionos" => Ok(PlatformType::Visionos),
            _ => Err(ConfigError::UnknownPlatformType {
                value: s.to_string(),
            }),
        }
    }
}

/// The SDK platform a single-architecture binary is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplePlatform {
    IosDevice,
    IosSimulator,
    WatchosDevice,
    WatchosSimulator,
    TvosDevice,
    TvosSimulator,
    MacOs,
    VisionosDevice,
    VisionosSimulator,
}

impl ApplePlatform {
    /// SDK platform name as it appears in Xcode's `Platforms/` directory.
    pub fn name_in_plist(&self) -> &'static str {
        match self {
            ApplePlatform::IosDevice => "iPhoneOS",
            ApplePlatform::IosSimulator => "iPhoneSimulator",
            ApplePlatform::WatchosDevice => "WatchOS",
            ApplePlatform::WatchosSimulator => "WatchSimulator",
            ApplePlatform::TvosDevice => "AppleTVOS",
            ApplePlatform::TvosSimulator => "AppleTVSimulator",
            ApplePlatform::MacOs => "MacOSX",
            ApplePlatform::VisionosDevice => "XROS",
            ApplePlatform::VisionosSimulator => "XRSimulator",
        }
    }

    /// Operating system component of the clang target triple.
    pub fn triple_os(&self) -> &'static str {
        match self {
            ApplePlatform::IosDevice | ApplePlatform::IosSimulator => "ios",
            ApplePlatform::WatchosDevice | ApplePlatform::WatchosSimulator => "watchos",
            ApplePlatform::TvosDevice | ApplePlatform::TvosSimulator => "tvos",
            ApplePlatform::MacOs => "macos",
            ApplePlatform::VisionosDevice | ApplePlatform::VisionosSimulator => "xros",
        }
    }

    /// Whether this is a simulator SDK.
    pub fn is_simulator(&self) -> bool {
        matches!(
            self,
            ApplePlatform::IosSimulator
                | ApplePlatform::WatchosSimulator
                | ApplePlatform::TvosSimulator
                | ApplePlatform::VisionosSimulator
        )
    }
}

impl fmt::Display for ApplePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_in_plist())
    }
}

/// A CPU identifier, e.g. `arm64`, `armv7k` or `sim_arm64`.
///
/// Whether it names a device or a simulator depends on the platform family
/// it is paired with (`arm64` is a simulator CPU on watchOS only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Architecture(String);

impl Architecture {
    /// Create an architecture from a bare CPU identifier.
    pub fn new(cpu: impl Into<String>) -> Self {
        Architecture(cpu.into())
    }

    /// Split a configuration-style CPU (`ios_x86_64`, `darwin_arm64`) into
    /// its platform family and architecture.
    pub fn from_config_cpu(value: &str) -> Result<(PlatformType, Architecture), ConfigError> {
        let prefixes = [
            ("ios_", PlatformType::Ios),
            ("watchos_", PlatformType::Watchos),
            ("tvos_", PlatformType::Tvos),
            ("darwin_", PlatformType::Macos),
            ("visionos_", PlatformType::Visionos),
        ];

        for (prefix, platform_type) in prefixes {
            if let Some(cpu) = value.strip_prefix(prefix) {
                if cpu.is_empty() {
                    break;
                }
                return Ok((platform_type, Architecture::new(cpu)));
            }
        }

        Err(ConfigError::UnknownCpu {
            value: value.to_string(),
        })
    }

    /// The CPU identifier.
    pub fn cpu(&self) -> &str {
        &self.0
    }

    /// CPU name as clang spells it in a target triple.
    pub fn triple_cpu(&self) -> &str {
        match self.0.as_str() {
            "sim_arm64" | "device_arm64" => "arm64",
            "device_arm64e" => "arm64e",
            other => other,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
