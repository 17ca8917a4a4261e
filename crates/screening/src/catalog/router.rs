use std::io::Cursor;
use std::sync::Arc;

use axum::extract::rejection::StringRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tracing::info;

use super::domain::{Location, Service};
use super::import::{import_locations, ImportSummary};
use super::repository::CatalogRepository;
use crate::access::{Action, Resource};
use crate::context::{parse_path_id, ServiceContext};
use crate::error::ApiError;
use crate::store::Store;

/// Administrative routes over locations and services.
pub fn catalog_router<S: Store>(context: Arc<ServiceContext<S>>) -> Router {
    Router::new()
        .route("/api/locations", get(list_locations_handler::<S>))
        .route("/api/locations/import", post(import_locations_handler::<S>))
        .route(
            "/api/locations/:location_id/toggle-status",
            patch(toggle_location_handler::<S>),
        )
        .route("/api/services", get(list_services_handler::<S>))
        .route(
            "/api/services/:service_id/toggle-status",
            patch(toggle_service_handler::<S>),
        )
        .with_state(context)
}

pub(crate) async fn list_locations_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Location>>, ApiError> {
    context
        .auth()
        .authorize(&headers, Resource::Countries, Action::View)?;
    Ok(Json(context.store().locations()?))
}

pub(crate) async fn list_services_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, ApiError> {
    context
        .auth()
        .authorize(&headers, Resource::Services, Action::View)?;
    Ok(Json(context.store().services()?))
}

pub(crate) async fn toggle_location_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(location_id): Path<String>,
) -> Result<Json<Location>, ApiError> {
    let user = context.auth().authorize_record(
        &headers,
        Resource::Countries,
        Action::Edit,
        &location_id,
    )?;
    let location_id = parse_path_id(&location_id, "location")?;
    let location = context
        .store()
        .toggle_location_disabled(&location_id)
        .map_err(|err| match ApiError::from(err) {
            ApiError::NotFound(_) => ApiError::NotFound("location not found".to_string()),
            other => other,
        })?;
    info!(location = %location.id, disabled = location.disabled, user = %user.id, "location status toggled");
    Ok(Json(location))
}

pub(crate) async fn toggle_service_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(service_id): Path<String>,
) -> Result<Json<Service>, ApiError> {
    let user = context.auth().authorize_record(
        &headers,
        Resource::Services,
        Action::Edit,
        &service_id,
    )?;
    let service_id = parse_path_id(&service_id, "service")?;
    let service = context
        .store()
        .toggle_service_disabled(&service_id)
        .map_err(|err| match ApiError::from(err) {
            ApiError::NotFound(_) => ApiError::NotFound("service not found".to_string()),
            other => other,
        })?;
    info!(service = %service.id, disabled = service.disabled, user = %user.id, "service status toggled");
    Ok(Json(service))
}

/// Accepts the CSV file as the raw request body.
pub(crate) async fn import_locations_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    body: Result<String, StringRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let user = context
        .auth()
        .authorize(&headers, Resource::Countries, Action::Create)?;
    let body = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if body.trim().is_empty() {
        return Err(ApiError::Validation("CSV body is empty".to_string()));
    }
    let summary = import_locations(context.store(), Cursor::new(body.into_bytes()))?;
    info!(user = %user.id, imported = summary.imported, skipped = summary.skipped, "locations imported");
    Ok(Json(summary))
}
