use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::domain::{DraftOrder, Order, OrderStats};
use crate::access::Action;
use crate::context::{parse_path_id, ServiceContext};
use crate::error::ApiError;
use crate::requirements::{RequirementsResolution, ServiceLocation};
use crate::store::Store;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequirementsRequest {
    #[serde(default)]
    pub(crate) items: Vec<ServiceLocation>,
}

/// Customer portal routes for building and submitting orders.
pub fn portal_router<S: Store>(context: Arc<ServiceContext<S>>) -> Router {
    Router::new()
        .route(
            "/api/portal/orders/requirements",
            post(requirements_handler::<S>),
        )
        .route("/api/portal/orders/draft", post(create_draft_handler::<S>))
        .route("/api/portal/orders/stats", get(stats_handler::<S>))
        .route("/api/portal/orders", get(list_handler::<S>))
        .route(
            "/api/portal/orders/:order_id",
            get(get_handler::<S>).put(update_draft_handler::<S>),
        )
        .route(
            "/api/portal/orders/:order_id/submit",
            post(submit_handler::<S>),
        )
        .with_state(context)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

pub(crate) async fn requirements_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    payload: Result<Json<RequirementsRequest>, JsonRejection>,
) -> Result<Json<RequirementsResolution>, ApiError> {
    context.auth().customer_actor(&headers)?;
    let request = json_body(payload)?;
    let resolution = context.resolver().resolve(&request.items)?;
    Ok(Json(resolution))
}

pub(crate) async fn create_draft_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    payload: Result<Json<DraftOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let actor = context.auth().order_actor(&headers, Action::Create)?;
    let draft = json_body(payload)?;
    let order = context.orders().create_draft(&actor, draft)?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub(crate) async fn update_draft_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    payload: Result<Json<DraftOrder>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let actor = context.auth().order_actor(&headers, Action::Edit)?;
    let order_id = parse_path_id(&order_id, "order")?;
    let draft = json_body(payload)?;
    let order = context.orders().update_draft(&actor, &order_id, draft)?;
    Ok(Json(order))
}

pub(crate) async fn submit_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let actor = context.auth().order_actor(&headers, Action::Edit)?;
    let order_id = parse_path_id(&order_id, "order")?;
    let order = context.orders().submit(&actor, &order_id)?;
    Ok(Json(order))
}

pub(crate) async fn get_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let actor = context.auth().customer_actor(&headers)?;
    let order_id = parse_path_id(&order_id, "order")?;
    Ok(Json(context.orders().get(&actor, &order_id)?))
}

pub(crate) async fn list_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let actor = context.auth().customer_actor(&headers)?;
    Ok(Json(context.orders().list(&actor)?))
}

pub(crate) async fn stats_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
) -> Result<Json<OrderStats>, ApiError> {
    let actor = context.auth().customer_actor(&headers)?;
    Ok(Json(context.orders().stats(&actor)?))
}
