//! Implementation of `fatbin plan` and `fatbin vars`.
//!
//! This is the configuration layer: it layers command-line options over the
//! loaded config, turns them into a [`UniversalBinaryTarget`], and hands that
//! to the graph builder.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::plan::{ActionGraph, MultiArchGraphBuilder};
use crate::builder::variables::BuildVariableSet;
use crate::core::platform::{Architecture, PlatformType};
use crate::core::target::{LibraryTarget, UniversalBinaryTarget, DEFAULT_OUT_DIR};
use crate::core::version::DottedVersion;
use crate::resolver::errors::ConfigError;
use crate::resolver::platform::VersionOverrides;
use crate::util::config::Config;

/// Options for planning a universal binary.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Logical target name
    pub name: String,

    /// Platform family (defaults to the family of `cpu`, then ios)
    pub platform_type: Option<PlatformType>,

    /// Configuration-style cpu, e.g. `ios_x86_64`
    pub cpu: Option<String>,

    /// Bare cpus for the platform family
    pub cpus: Vec<String>,

    /// Explicit Xcode version
    pub xcode_version: Option<String>,

    /// Explicit SDK version for the platform family
    pub sdk_version: Option<String>,

    /// Explicit minimum OS versions per platform family
    pub minimum_os: Vec<(PlatformType, String)>,

    /// Binary sources
    pub srcs: Vec<PathBuf>,

    /// Static library dependencies
    pub deps: Vec<LibraryTarget>,

    /// Output directory (overrides config)
    pub out_dir: Option<PathBuf>,
}

/// Combine config overrides with explicit options (options win).
pub fn effective_overrides(
    config: &Config,
    platform_type: PlatformType,
    opts: &PlanOptions,
) -> Result<VersionOverrides> {
    let mut cli = VersionOverrides::default();

    if let Some(v) = &opts.xcode_version {
        cli.xcode_version = Some(DottedVersion::parse_field("xcode_version", v)?);
    }
    if let Some(v) = &opts.sdk_version {
        let field = format!("{}_sdk_version", platform_type);
        cli.sdk_version
            .insert(platform_type, DottedVersion::parse_field(&field, v)?);
    }
    for (pt, v) in &opts.minimum_os {
        let field = format!("{}_minimum_os", pt);
        cli.minimum_os
            .insert(*pt, DottedVersion::parse_field(&field, v)?);
    }

    let mut overrides = config.options.overrides();
    overrides.merge(cli);
    Ok(overrides)
}

/// Determine the platform family and architectures to build.
///
/// Cpus come from the explicit options (`cpu` first, then `cpus`), then the
/// config, then the family's default cpu.
pub fn select_architectures(
    config: &Config,
    opts: &PlanOptions,
) -> Result<(PlatformType, Vec<Architecture>), ConfigError> {
    let from_cpu = opts
        .cpu
        .as_deref()
        .map(Architecture::from_config_cpu)
        .transpose()?;

    let platform_type = match (opts.platform_type, &from_cpu) {
        (Some(requested), Some((cpu_platform, arch))) if requested != *cpu_platform => {
            return Err(ConfigError::UnsupportedArchitecture {
                platform_type: requested,
                cpu: format!("{}_{}", cpu_platform, arch),
            });
        }
        (Some(requested), _) => requested,
        (None, Some((cpu_platform, _))) => *cpu_platform,
        (None, None) => PlatformType::Ios,
    };

    let architectures = if !opts.cpus.is_empty() || from_cpu.is_some() {
        // The configuration cpu leads, followed by any explicit cpus
        let mut archs: Vec<Architecture> = from_cpu.into_iter().map(|(_, arch)| arch).collect();
        for arch in opts.cpus.iter().map(Architecture::new) {
            if !archs.contains(&arch) {
                archs.push(arch);
            }
        }
        archs
    } else if !config.options.cpus_for(platform_type).is_empty() {
        config
            .options
            .cpus_for(platform_type)
            .iter()
            .map(Architecture::new)
            .collect()
    } else {
        vec![Architecture::new(platform_type.default_cpu())]
    };

    Ok((platform_type, architectures))
}

/// Build the request for the graph builder.
pub fn build_request(config: &Config, opts: &PlanOptions) -> Result<UniversalBinaryTarget> {
    let (platform_type, architectures) = select_architectures(config, opts)?;
    let out_dir = opts
        .out_dir
        .clone()
        .or_else(|| config.build.out_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    Ok(UniversalBinaryTarget {
        name: opts.name.clone(),
        platform_type,
        architectures,
        srcs: opts.srcs.clone(),
        deps: opts.deps.clone(),
        out_dir,
    })
}

/// Plan the universal binary described by `opts`.
pub fn plan_universal_binary(config: &Config, opts: &PlanOptions) -> Result<ActionGraph> {
    let request = build_request(config, opts)?;
    let overrides = effective_overrides(config, request.platform_type, opts)?;

    tracing::debug!(
        "planning {} for {} on {}",
        request.name,
        request.platform_type,
        request
            .architectures
            .iter()
            .map(|a| a.cpu())
            .collect::<Vec<_>>()
            .join(",")
    );

    let graph = MultiArchGraphBuilder::new(&config.xcode, &overrides)
        .build_graph(&request)
        .with_context(|| format!("failed to plan `{}`", request.name))?;

    Ok(graph)
}

/// Resolve the variable set of every selected architecture.
pub fn resolve_variables(config: &Config, opts: &PlanOptions) -> Result<Vec<BuildVariableSet>> {
    let (platform_type, architectures) = select_architectures(config, opts)?;
    let overrides = effective_overrides(config, platform_type, opts)?;
    let builder = MultiArchGraphBuilder::new(&config.xcode, &overrides);

    architectures
        .iter()
        .map(|arch| {
            builder
                .resolve_variables(platform_type, arch)
                .with_context(|| format!("failed to resolve variables for `{}`", arch))
        })
        .collect()
}
