//! Command-line templating for Apple toolchain actions.
//!
//! Every command is rendered from an action's [`BuildVariableSet`] alone.
//! The Xcode selection travels in the environment the way `xcrun`-style
//! wrappers expect it, and the minimum OS is folded into the clang target
//! triple.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::variables::{
    BuildVariableSet, APPLE_SDK_PLATFORM_VALUE, APPLE_SDK_VERSION_OVERRIDE_VALUE, VERSION_MIN,
    XCODE_VERSION_OVERRIDE_VALUE,
};
use crate::core::version::DottedVersion;
use crate::resolver::errors::ConfigError;

/// Environment variable selecting the Xcode version.
pub const XCODE_VERSION_OVERRIDE_ENV: &str = "XCODE_VERSION_OVERRIDE";
/// Environment variable selecting the SDK version.
pub const APPLE_SDK_VERSION_OVERRIDE_ENV: &str = "APPLE_SDK_VERSION_OVERRIDE";
/// Environment variable selecting the SDK platform.
pub const APPLE_SDK_PLATFORM_ENV: &str = "APPLE_SDK_PLATFORM";

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "clang", "lipo")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Render as a single shell-like line, environment first.
    pub fn display_line(&self) -> String {
        let mut parts: Vec<String> = self.env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        parts.push(self.program.display().to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Renders compile, archive, link and combine commands.
#[derive(Debug, Clone)]
pub struct AppleToolchain {
    /// C/C++ compiler driver
    pub clang: PathBuf,
    /// Static archiver
    pub libtool: PathBuf,
    /// Universal binary tool
    pub lipo: PathBuf,
}

impl Default for AppleToolchain {
    fn default() -> Self {
        AppleToolchain {
            clang: PathBuf::from("clang"),
            libtool: PathBuf::from("libtool"),
            lipo: PathBuf::from("lipo"),
        }
    }
}

impl AppleToolchain {
    /// Clang target triple, e.g. `arm64-apple-ios12.0-simulator`.
    pub fn target_triple(vars: &BuildVariableSet) -> Result<String, ConfigError> {
        let sdk_platform = vars
            .platform_type()
            .sdk_platform(vars.architecture())?;
        let version_min = vars.get(VERSION_MIN).unwrap_or_default();

        let mut triple = format!(
            "{}-apple-{}{}",
            vars.architecture().triple_cpu(),
            sdk_platform.triple_os(),
            version_min
        );
        if sdk_platform.is_simulator() {
            triple.push_str("-simulator");
        }
        Ok(triple)
    }

    fn with_sdk_env(cmd: CommandSpec, vars: &BuildVariableSet) -> CommandSpec {
        let mut cmd = cmd;
        for (env, var) in [
            (XCODE_VERSION_OVERRIDE_ENV, XCODE_VERSION_OVERRIDE_VALUE),
            (APPLE_SDK_VERSION_OVERRIDE_ENV, APPLE_SDK_VERSION_OVERRIDE_VALUE),
            (APPLE_SDK_PLATFORM_ENV, APPLE_SDK_PLATFORM_VALUE),
        ] {
            if let Some(value) = vars.get(var) {
                cmd = cmd.env(env, value);
            }
        }
        cmd
    }

    /// Compile one source file.
    pub fn compile_command(
        &self,
        vars: &BuildVariableSet,
        source: &Path,
        output: &Path,
    ) -> Result<CommandSpec, ConfigError> {
        let cmd = CommandSpec::new(&self.clang)
            .arg("-target")
            .arg(Self::target_triple(vars)?)
            .arg("-c")
            .arg(source.display().to_string())
            .arg("-o")
            .arg(output.display().to_string());
        Ok(Self::with_sdk_env(cmd, vars))
    }

    /// Archive objects into a static library.
    pub fn archive_command(
        &self,
        vars: &BuildVariableSet,
        objects: &[PathBuf],
        output: &Path,
    ) -> CommandSpec {
        let cmd = CommandSpec::new(&self.libtool)
            .arg("-static")
            .arg("-o")
            .arg(output.display().to_string())
            .args(objects.iter().map(|o| o.display().to_string()));
        Self::with_sdk_env(cmd, vars)
    }

    /// Link one architecture's executable.
    pub fn link_command(
        &self,
        vars: &BuildVariableSet,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<CommandSpec, ConfigError> {
        let cmd = CommandSpec::new(&self.clang)
            .arg("-target")
            .arg(Self::target_triple(vars)?)
            .args(inputs.iter().map(|i| i.display().to_string()))
            .arg("-o")
            .arg(output.display().to_string());
        Ok(Self::with_sdk_env(cmd, vars))
    }

    /// Merge single-architecture binaries into one universal binary.
    pub fn combine_command(
        &self,
        xcode_version: &DottedVersion,
        inputs: &[PathBuf],
        output: &Path,
    ) -> CommandSpec {
        CommandSpec::new(&self.lipo)
            .arg("-create")
            .args(inputs.iter().map(|i| i.display().to_string()))
            .arg("-output")
            .arg(output.display().to_string())
            .env(XCODE_VERSION_OVERRIDE_ENV, xcode_version.as_str())
    }
}
