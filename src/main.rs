mod blob;
mod cli;
mod commands;
mod config;
mod model;
mod report;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split(args) => commands::split::run(args),
        Commands::Analytics(args) => commands::analytics::run(args),
        Commands::Reports(args) => commands::reports::run(args),
        Commands::Tasks(args) => commands::tasks::run(args),
        Commands::Announcements(args) => commands::announcements::run(args),
        Commands::Profiles(args) => commands::profiles::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
