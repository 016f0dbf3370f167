//! ParkSync CLI
//!
//! Serves the refresh API, runs one-off refreshes and sweeps, and manages
//! `~/.parksync/config.ini`.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::refresh::PairArgs;
use commands::serve::ServeArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "parksync")]
#[command(version, about = "Quota-aware refresh of national park data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Refresh one park/data kind pair from upstream
    Refresh(PairArgs),

    /// Refresh every park and data kind, pacing requests to fit quotas
    Sweep,

    /// Print a cached artifact
    Show(PairArgs),

    /// Show configured per-service quotas
    Quota,

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve(args) => commands::serve::run(args),
        Commands::Refresh(args) => commands::refresh::run_refresh(args),
        Commands::Sweep => commands::sweep::run(),
        Commands::Show(args) => commands::refresh::run_show(args),
        Commands::Quota => commands::refresh::run_quota(),
        Commands::Config { command } => commands::config::run(command),
    }
}
