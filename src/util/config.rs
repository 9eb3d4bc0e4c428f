//! Configuration file support for fatbin.
//!
//! fatbin reads two configuration file locations:
//! - Global: `~/.fatbin/config.toml` - User-wide defaults
//! - Project: `.fatbin/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [xcode]
//! default_version = "15.2"
//!
//! [xcode.sdk_defaults]
//! ios = "17.2"
//!
//! [[xcode.versions]]
//! version = "15.2"
//! aliases = ["15"]
//! sdk_defaults = { ios = "17.2", watchos = "10.2" }
//!
//! [options]
//! xcode_version = "15.2"
//! minimum_os = { ios = "15.0" }
//! cpus = { ios = ["arm64", "sim_arm64"] }
//!
//! [build]
//! out_dir = "fatbin-out"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::platform::PlatformType;
use crate::core::version::DottedVersion;
use crate::resolver::platform::VersionOverrides;
use crate::resolver::xcode::XcodeVersionTable;

/// fatbin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Known Xcode versions and SDK defaults
    ///
    /// A file without an `[xcode]` section contributes an empty table, so
    /// merging it keeps whatever lower-precedence layers provided.
    #[serde(default)]
    pub xcode: XcodeVersionTable,

    /// Version and CPU overrides
    pub options: OptionsConfig,

    /// Build settings
    pub build: BuildConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            xcode: XcodeVersionTable::builtin(),
            options: OptionsConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

/// Overrides normally given as command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Xcode version to build with
    pub xcode_version: Option<DottedVersion>,

    /// SDK version per platform family
    pub sdk_version: BTreeMap<PlatformType, DottedVersion>,

    /// Minimum OS version per platform family
    pub minimum_os: BTreeMap<PlatformType, DottedVersion>,

    /// CPUs to build per platform family
    pub cpus: BTreeMap<PlatformType, Vec<String>>,
}

impl OptionsConfig {
    /// The version overrides in this section.
    pub fn overrides(&self) -> VersionOverrides {
        VersionOverrides {
            xcode_version: self.xcode_version.clone(),
            sdk_version: self.sdk_version.clone(),
            minimum_os: self.minimum_os.clone(),
        }
    }

    /// Configured CPUs for a platform family (empty if none).
    pub fn cpus_for(&self, platform_type: PlatformType) -> &[String] {
        self.cpus
            .get(&platform_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Root directory for planned outputs
    pub out_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.xcode.merge(other.xcode);

        // Options
        if other.options.xcode_version.is_some() {
            self.options.xcode_version = other.options.xcode_version;
        }
        self.options.sdk_version.extend(other.options.sdk_version);
        self.options.minimum_os.extend(other.options.minimum_os);
        // CPU lists are replaced per platform, not merged
        self.options.cpus.extend(other.options.cpus);

        // Build settings
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.fatbin/config.toml)
/// 2. Global config (~/.fatbin/config.toml)
/// 3. Defaults
///
/// Missing files are skipped. A file that exists but fails to parse is an
/// error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load(global_path)?);
    }

    // Project config overrides global
    if project_path.exists() {
        tracing::debug!("using project config {}", project_path.display());
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global fatbin config directory (~/.fatbin).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".fatbin"))
}

/// Get the global config path (~/.fatbin/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.fatbin/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".fatbin").join("config.toml")
}
