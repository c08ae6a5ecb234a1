use crate::demo::{run_demo, run_location_import, DemoArgs, LocationImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use parkwise::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Parkwise",
    about = "Run the parking occupancy and fee service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Manage parking locations
    Locations {
        #[command(subcommand)]
        command: LocationsCommand,
    },
    /// Replay a scripted day of entries and exits against the demo locations
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LocationsCommand {
    /// Check a location CSV against a fresh registry and print what it provisions
    Import(LocationImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Start with an empty registry even when APP_SEED_DEMO is set
    #[arg(long)]
    pub(crate) no_seed: bool,
    /// Provision locations from a CSV file before accepting traffic
    #[arg(long, value_name = "CSV")]
    pub(crate) locations: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Locations {
            command: LocationsCommand::Import(args),
        } => run_location_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
