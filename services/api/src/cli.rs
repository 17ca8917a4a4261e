use crate::maintenance::{
    run_catalog_audit, run_customer_reconcile, run_location_import, AuditArgs, ImportArgs,
    ReconcileArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use screening::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Screening Portal",
    about = "Serve the background-screening order portal and run catalog maintenance",
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
    /// Inspect the requirement catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Maintain customer accounts
    Customers {
        #[command(subcommand)]
        command: CustomersCommand,
    },
    /// Maintain countries and subregions
    Locations {
        #[command(subcommand)]
        command: LocationsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Report unassigned and duplicate display orders
    Audit(AuditArgs),
}

#[derive(Subcommand, Debug)]
enum CustomersCommand {
    /// Promote subaccounts whose master account no longer exists
    Reconcile(ReconcileArgs),
}

#[derive(Subcommand, Debug)]
enum LocationsCommand {
    /// Bulk-create locations from a CSV file
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Dataset to load instead of APP_SEED_PATH
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog {
            command: CatalogCommand::Audit(args),
        } => run_catalog_audit(args),
        Command::Customers {
            command: CustomersCommand::Reconcile(args),
        } => run_customer_reconcile(args),
        Command::Locations {
            command: LocationsCommand::Import(args),
        } => run_location_import(args),
    }
}
