//! Command implementations

pub mod completions;
pub mod plan;
pub mod vars;

use anyhow::{Context, Result};

use crate::cli::ToolchainArgs;
use fatbin::ops::PlanOptions;
use fatbin::util::config::{global_config_path, load_config, project_config_path, Config};

/// Load the config for the current directory, or from `--config`.
pub fn load(args: &ToolchainArgs) -> Result<Config> {
    if let Some(path) = &args.config {
        let mut config = Config::default();
        config.merge(Config::load(path)?);
        return Ok(config);
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(&cwd))
}

/// Options shared by `plan` and `vars`.
pub fn plan_options(name: &str, args: &ToolchainArgs) -> PlanOptions {
    PlanOptions {
        name: name.to_string(),
        platform_type: args.platform_type,
        cpu: args.cpu.clone(),
        cpus: args.arch.clone(),
        xcode_version: args.xcode_version.clone(),
        sdk_version: args.sdk_version.clone(),
        minimum_os: args.minimum_os.clone(),
        ..Default::default()
    }
}
