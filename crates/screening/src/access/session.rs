use std::sync::Arc;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permissions::{Action, PermissionSet, Resource};
use crate::store::RepositoryError;

/// Authenticated account with its resolved permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Set for portal users acting on behalf of a customer account.
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// The portal user a customer-scoped operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub customer_id: Uuid,
}

pub trait SessionRepository: Send + Sync {
    fn user_for_session(&self, token: &str) -> Result<Option<User>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("no valid session")]
    Unauthenticated,
    #[error("missing permission {}.{}", .resource.label(), .action.map(Action::label).unwrap_or("*"))]
    Forbidden {
        resource: Resource,
        action: Option<Action>,
    },
    #[error("user is not associated with a customer")]
    NoCustomer,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Resolves the session cookie on a request to a user.
pub struct Authenticator<S> {
    sessions: Arc<S>,
    cookie_name: String,
}

impl<S> Authenticator<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>, cookie_name: impl Into<String>) -> Self {
        Self {
            sessions,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<User, AccessError> {
        let token =
            session_token(headers, &self.cookie_name).ok_or(AccessError::Unauthenticated)?;
        self.sessions
            .user_for_session(token)?
            .ok_or(AccessError::Unauthenticated)
    }

    pub fn authorize(
        &self,
        headers: &HeaderMap,
        resource: Resource,
        action: Action,
    ) -> Result<User, AccessError> {
        let user = self.authenticate(headers)?;
        ensure_permission(&user, resource, action)?;
        Ok(user)
    }

    /// Like [`Authenticator::authorize`], but a grant scoped to `record_id` is
    /// enough.
    pub fn authorize_record(
        &self,
        headers: &HeaderMap,
        resource: Resource,
        action: Action,
        record_id: &str,
    ) -> Result<User, AccessError> {
        let user = self.authenticate(headers)?;
        if user.permissions.allows_id(resource, record_id.trim()) {
            return Ok(user);
        }
        ensure_permission(&user, resource, action)?;
        Ok(user)
    }

    /// Portal routes act on behalf of the user's customer.
    pub fn customer_actor(&self, headers: &HeaderMap) -> Result<Actor, AccessError> {
        let user = self.authenticate(headers)?;
        actor_for(&user)
    }

    /// A customer actor that also holds `orders.<action>`; used by routes
    /// that change orders.
    pub fn order_actor(&self, headers: &HeaderMap, action: Action) -> Result<Actor, AccessError> {
        let user = self.authenticate(headers)?;
        let actor = actor_for(&user)?;
        ensure_permission(&user, Resource::Orders, action)?;
        Ok(actor)
    }
}

fn actor_for(user: &User) -> Result<Actor, AccessError> {
    let customer_id = user.customer_id.ok_or(AccessError::NoCustomer)?;
    Ok(Actor {
        user_id: user.id,
        customer_id,
    })
}

fn ensure_permission(user: &User, resource: Resource, action: Action) -> Result<(), AccessError> {
    if user.permissions.has_permission(resource, Some(action)) {
        return Ok(());
    }
    tracing::debug!(user = %user.id, resource = resource.label(), action = action.label(), "permission denied");
    Err(AccessError::Forbidden {
        resource,
        action: Some(action),
    })
}

/// Finds `name=value` across every `Cookie` header on the request.
pub fn session_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}
