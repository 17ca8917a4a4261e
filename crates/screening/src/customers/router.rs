use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::patch;
use axum::{Json, Router};
use tracing::info;

use super::domain::Customer;
use super::repository::CustomerRepository;
use crate::access::{Action, Resource};
use crate::context::{parse_path_id, ServiceContext};
use crate::error::ApiError;
use crate::store::{RepositoryError, Store};

pub fn customer_router<S: Store>(context: Arc<ServiceContext<S>>) -> Router {
    Router::new()
        .route(
            "/api/customers/:customer_id/toggle-status",
            patch(toggle_customer_handler::<S>),
        )
        .with_state(context)
}

pub(crate) async fn toggle_customer_handler<S: Store>(
    State(context): State<Arc<ServiceContext<S>>>,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let user = context.auth().authorize_record(
        &headers,
        Resource::Customers,
        Action::Edit,
        &customer_id,
    )?;
    let customer_id = parse_path_id(&customer_id, "customer")?;
    let customer = match context.store().toggle_customer_disabled(&customer_id) {
        Ok(customer) => customer,
        Err(RepositoryError::NotFound) => {
            return Err(ApiError::NotFound("customer not found".to_string()))
        }
        Err(other) => return Err(other.into()),
    };
    info!(customer = %customer.id, disabled = customer.disabled, user = %user.id, "customer status toggled");
    Ok(Json(customer))
}
