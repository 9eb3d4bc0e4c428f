//! `fatbin plan` command

use anyhow::{Context, Result};

use crate::cli::PlanArgs;
use fatbin::builder::ActionKind;
use fatbin::ops::plan_universal_binary;

pub fn execute(args: PlanArgs) -> Result<()> {
    let config = super::load(&args.toolchain)?;

    let mut opts = super::plan_options(&args.name, &args.toolchain);
    opts.srcs = args.srcs;
    opts.deps = args.deps;
    opts.out_dir = args.out_dir;

    let graph = plan_universal_binary(&config, &opts)?;

    if args.json {
        let json = serde_json::to_string_pretty(&graph.summary())
            .context("failed to serialize plan")?;
        println!("{}", json);
        return Ok(());
    }

    let cpus: Vec<String> = graph
        .units()
        .iter()
        .map(|u| u.architecture.to_string())
        .collect();

    println!(
        "Plan for '{}' ({}: {}):",
        graph.target(),
        graph.platform_type(),
        cpus.join(", ")
    );
    println!();

    for (index, action) in graph.execution_order().into_iter().enumerate() {
        println!("  {}. {}", index + 1, action.describe());
        println!("     -> {}", action.output());
        if action.kind() == ActionKind::Combine {
            for input in action.inputs() {
                println!("        <- {}", input);
            }
        }
        println!("     $ {}", action.command().display_line());
        println!();
    }

    println!("Universal binary: {}", graph.universal_binary());

    Ok(())
}
