//! extconf CLI - configure the build of a native extension module

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("extconf=debug")
    } else {
        EnvFilter::new("extconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Objects(args) => commands::objects::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
