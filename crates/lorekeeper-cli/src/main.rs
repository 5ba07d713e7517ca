//! Lorekeeper CLI - validate campaign knowledge graphs from the command line.

use anyhow::Context;
use clap::Parser;
use lorekeeper_cli::commands;
use lorekeeper_cli::{block_on_bounded, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let result = block_on_bounded(run())
        .context("starting async runtime")
        .and_then(|result| result);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let formatter = Formatter::new(cli.format, !cli.no_color);

    let output = match cli.command {
        Command::Validate(args) => {
            let job = args.job.display().to_string();
            commands::execute_validate(args, &formatter)
                .await
                .with_context(|| format!("validating {}", job))?
        }
        Command::Config(args) => commands::execute_config(args)?,
    };

    println!("{}", output);
    Ok(())
}

/// Log to stderr so stdout carries only the report
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
