//! Forge CLI - a declarative, multi-platform build orchestrator for native code.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, GlobalFlags};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { EnvFilter::new("forge=debug") } else { EnvFilter::new("forge=info") };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let global = GlobalFlags::from(&cli);

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Rebuild(args) => commands::rebuild::execute(args, &global),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Run(args) => commands::run::execute(args, &global),
        Commands::Test(args) => commands::test::execute(args, &global),
        Commands::Info(args) => commands::info::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
