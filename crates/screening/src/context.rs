use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use crate::access::Authenticator;
use crate::clock::Clock;
use crate::config::PortalConfig;
use crate::error::ApiError;
use crate::orders::OrderService;
use crate::requirements::RequirementsResolver;
use crate::store::Store;

/// Services shared by every request handler; built once at process start.
pub struct ServiceContext<S> {
    store: Arc<S>,
    auth: Authenticator<S>,
    resolver: RequirementsResolver<S>,
    orders: OrderService<S>,
}

impl<S> ServiceContext<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, portal: &PortalConfig) -> Self {
        Self {
            auth: Authenticator::new(Arc::clone(&store), portal.session_cookie.clone()),
            resolver: RequirementsResolver::new(Arc::clone(&store)),
            orders: OrderService::new(Arc::clone(&store), clock)
                .with_number_retries(portal.order_number_retries),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn auth(&self) -> &Authenticator<S> {
        &self.auth
    }

    pub fn resolver(&self) -> &RequirementsResolver<S> {
        &self.resolver
    }

    pub fn orders(&self) -> &OrderService<S> {
        &self.orders
    }
}

/// Every JSON API route: portal orders, catalog administration and customers.
pub fn api_router<S: Store>(context: Arc<ServiceContext<S>>) -> Router {
    crate::orders::portal_router(Arc::clone(&context))
        .merge(crate::catalog::catalog_router(Arc::clone(&context)))
        .merge(crate::customers::customer_router(context))
}

/// Malformed ids can never match a record, so they read as missing.
pub(crate) fn parse_path_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(format!("{entity} not found")))
}
