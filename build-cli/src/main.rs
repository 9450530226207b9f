mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Expand and check CI build configurations
#[derive(Parser, Debug)]
#[command(name = "cibuild", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Expand a build configuration into its job matrix
    Expand(commands::expand::ExpandArgs),
    /// Validate a build configuration
    Validate(commands::validate::ValidateArgs),
    /// Reconcile a user record against a recorded remote profile
    SyncUser(commands::sync_user::SyncUserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(command = ?cli.command, "starting cibuild");

    match cli.command {
        Commands::Expand(args) => commands::expand::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::SyncUser(args) => commands::sync_user::execute(args).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
