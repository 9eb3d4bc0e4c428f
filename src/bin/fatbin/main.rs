//! fatbin CLI - plan universal binaries for Apple platforms

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fatbin::resolver::{ConfigError, LookupError};
use fatbin::util::diagnostic;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn report(err: &anyhow::Error, color: bool) {
    let diag = err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<LookupError>().map(LookupError::to_diagnostic)
        }
    });

    match diag {
        Some(diag) => {
            // Keep the outer context ("failed to plan ...") visible
            let diag = if err.chain().count() > 1 {
                diag.with_context(err.to_string())
            } else {
                diag
            };
            diagnostic::emit(&diag, color);
        }
        None => eprintln!("error: {:#}", err),
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("fatbin=debug")
    } else {
        EnvFilter::new("fatbin=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Vars(args) => commands::vars::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
