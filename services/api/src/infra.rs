use metrics_exporter_prometheus::PrometheusHandle;
use screening::config::AppConfig;
use screening::error::AppError;
use screening::store::{MemoryStore, Seed};
use screening::telemetry;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Configuration and logging for the one-shot maintenance commands.
pub(crate) fn init_maintenance() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

/// Loads the dataset at `path`, or starts from an empty store.
pub(crate) fn load_store(path: Option<&Path>) -> Result<MemoryStore, AppError> {
    let Some(path) = path else {
        warn!("no dataset configured; starting with an empty store");
        return Ok(MemoryStore::default());
    };

    let seed = Seed::from_path(path)?;
    info!(
        path = %path.display(),
        locations = seed.locations.len(),
        services = seed.services.len(),
        customers = seed.customers.len(),
        orders = seed.orders.len(),
        "dataset loaded"
    );
    Ok(MemoryStore::from_seed(seed)?)
}
