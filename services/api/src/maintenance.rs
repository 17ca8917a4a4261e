use crate::infra::{init_maintenance, load_store};
use clap::Args;
use screening::catalog::{audit_display_order, import_locations, DataQualityWarning};
use screening::customers::{hierarchy_violations, reconcile_orphans, CustomerRepository};
use screening::error::AppError;
use screening::store::MemoryStore;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// Dataset to audit
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Exit with an error when any warning is found
    #[arg(long)]
    pub(crate) strict: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReconcileArgs {
    /// Dataset holding the customer accounts
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Write the reconciled dataset back to the seed file
    #[arg(long)]
    pub(crate) write: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Dataset to import into
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// CSV with name,code2,code3,numeric,parent_code2 columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Write the updated dataset back to the seed file
    #[arg(long)]
    pub(crate) write: bool,
}

pub(crate) fn run_catalog_audit(args: AuditArgs) -> Result<(), AppError> {
    init_maintenance()?;
    let store = load_store(Some(args.seed.as_path()))?;
    let warnings = audit_display_order(&store)?;
    render_warnings(&warnings);

    if args.strict && !warnings.is_empty() {
        return Err(AppError::DataQuality(warnings.len()));
    }
    Ok(())
}

pub(crate) fn run_customer_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    init_maintenance()?;
    let store = load_store(Some(args.seed.as_path()))?;

    for violation in hierarchy_violations(&store.customers()?) {
        println!("- hierarchy violation: {violation}");
    }

    let promoted = reconcile_orphans(&store)?;
    if promoted.is_empty() {
        println!("No orphaned subaccounts found");
    } else {
        println!("Promoted {} orphaned subaccount(s) to master:", promoted.len());
        for id in &promoted {
            println!("  - {id}");
        }
    }

    persist(&store, &args.seed, args.write && !promoted.is_empty())
}

pub(crate) fn run_location_import(args: ImportArgs) -> Result<(), AppError> {
    init_maintenance()?;
    let store = load_store(Some(args.seed.as_path()))?;
    let reader = BufReader::new(File::open(&args.csv)?);
    let summary = import_locations(&store, reader)?;

    println!(
        "Imported {} location(s), skipped {} row(s)",
        summary.imported, summary.skipped
    );

    persist(&store, &args.seed, args.write && summary.imported > 0)
}

fn render_warnings(warnings: &[DataQualityWarning]) {
    if warnings.is_empty() {
        println!("Catalog audit: no data-quality warnings");
        return;
    }
    println!("Catalog audit: {} warning(s)", warnings.len());
    for warning in warnings {
        println!("- {warning}");
    }
}

fn persist(store: &MemoryStore, path: &Path, write: bool) -> Result<(), AppError> {
    if !write {
        return Ok(());
    }
    store.snapshot()?.write_to_path(path)?;
    info!(path = %path.display(), "dataset written");
    println!("Dataset written to {}", path.display());
    Ok(())
}
