//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use fatbin::core::{LibraryTarget, PlatformType};

/// fatbin - plan universal binaries for Apple platforms
#[derive(Parser)]
#[command(name = "fatbin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan the actions that build a universal binary
    Plan(PlanArgs),

    /// Show the resolved toolchain variables for each architecture
    Vars(VarsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Toolchain selection flags shared by `plan` and `vars`.
#[derive(Args, Debug, Clone)]
pub struct ToolchainArgs {
    /// Platform family: ios, watchos, tvos, macos or visionos
    #[arg(long = "platform-type", value_parser = parse_platform_type)]
    pub platform_type: Option<PlatformType>,

    /// Configuration-style cpu, e.g. ios_x86_64 or darwin_arm64
    #[arg(long)]
    pub cpu: Option<String>,

    /// Architecture to include (repeatable)
    #[arg(long = "arch", value_name = "CPU")]
    pub arch: Vec<String>,

    /// Xcode version to build with
    #[arg(long = "xcode-version", env = "FATBIN_XCODE_VERSION")]
    pub xcode_version: Option<String>,

    /// SDK version for the platform family
    #[arg(long = "sdk-version")]
    pub sdk_version: Option<String>,

    /// Minimum OS version, as PLATFORM=VERSION (repeatable)
    #[arg(long = "minimum-os", value_name = "PLATFORM=VERSION", value_parser = parse_minimum_os)]
    pub minimum_os: Vec<(PlatformType, String)>,

    /// Config file to use instead of the global and project configs
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Name of the universal binary
    pub name: String,

    #[command(flatten)]
    pub toolchain: ToolchainArgs,

    /// Source file of the binary (repeatable)
    #[arg(long = "src", value_name = "PATH")]
    pub srcs: Vec<PathBuf>,

    /// Static library dependency, as NAME=SRC[,SRC...] (repeatable)
    #[arg(long = "dep", value_name = "NAME=SRCS", value_parser = parse_library)]
    pub deps: Vec<LibraryTarget>,

    /// Output directory (default: fatbin-out)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct VarsArgs {
    #[command(flatten)]
    pub toolchain: ToolchainArgs,

    /// Print only this variable
    #[arg(long = "var", value_name = "NAME")]
    pub var: Option<String>,

    /// Print the variable sets as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_platform_type(s: &str) -> Result<PlatformType, String> {
    s.parse::<PlatformType>().map_err(|e| e.to_string())
}

fn parse_minimum_os(s: &str) -> Result<(PlatformType, String), String> {
    let (platform, version) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=VERSION, got `{}`", s))?;
    Ok((parse_platform_type(platform)?, version.to_string()))
}

fn parse_library(s: &str) -> Result<LibraryTarget, String> {
    let (name, srcs) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SRC[,SRC...], got `{}`", s))?;
    if name.is_empty() {
        return Err(format!("library name is empty in `{}`", s));
    }
    Ok(LibraryTarget::new(
        name,
        srcs.split(',').filter(|src| !src.is_empty()),
    ))
}
