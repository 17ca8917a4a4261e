use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use screening::catalog::audit_display_order;
use screening::clock::SystemClock;
use screening::config::AppConfig;
use screening::error::AppError;
use screening::telemetry;
use screening::{api_router, ServiceContext};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed.take() {
        config.store.seed_path = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(load_store(config.store.seed_path.as_deref())?);
    let warnings = audit_display_order(store.as_ref())?;
    for warning in &warnings {
        warn!(%warning, "catalog data-quality warning");
    }

    let context = Arc::new(ServiceContext::new(
        store,
        Arc::new(SystemClock),
        &config.portal,
    ));

    let app = with_operational_routes(api_router(context))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        catalog_warnings = warnings.len(),
        "screening portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
