//! `fatbin vars` command

use anyhow::{Context, Result};

use crate::cli::VarsArgs;
use fatbin::ops::resolve_variables;

pub fn execute(args: VarsArgs) -> Result<()> {
    let config = super::load(&args.toolchain)?;
    let opts = super::plan_options("vars", &args.toolchain);

    let sets = resolve_variables(&config, &opts)?;

    if let Some(name) = &args.var {
        for vars in &sets {
            let action = format!("{} [{}]", vars.platform_type(), vars.architecture());
            let value = vars.lookup(&action, name)?;
            if sets.len() == 1 {
                println!("{}", value);
            } else {
                println!("{}: {}", vars.architecture(), value);
            }
        }
        return Ok(());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&sets).context("failed to serialize variables")?;
        println!("{}", json);
        return Ok(());
    }

    for (i, vars) in sets.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("[{} {}]", vars.platform_type(), vars.architecture());
        for (name, value) in vars.iter() {
            println!("{} = {}", name, value);
        }
    }

    Ok(())
}
