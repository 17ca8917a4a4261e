use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{DraftOrder, Order, OrderStats, OrderStatus, Subject};
use super::numbering::{customer_code_for, format_order_number, within_day};
use super::repository::OrderRepository;
use crate::access::Actor;
use crate::catalog::CatalogRepository;
use crate::clock::Clock;
use crate::customers::CustomerRepository;
use crate::requirements::{RequirementsResolver, ResolveError, ServiceLocation};
use crate::store::RepositoryError;

const DEFAULT_NUMBER_RETRIES: u32 = 3;

/// Error raised by the order workflow.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order must include at least one service item")]
    EmptyItems,
    #[error("subject is missing required fields: {}", .0.join(", "))]
    MissingSubjectFields(Vec<&'static str>),
    #[error("customer {0} not found")]
    CustomerNotFound(Uuid),
    #[error("customer {0} is disabled")]
    CustomerDisabled(Uuid),
    #[error("Order not found or already submitted")]
    NotFoundOrSubmitted,
    #[error("Order not found")]
    NotFound,
    #[error("could not allocate a unique order number after {0} attempts")]
    NumberExhausted(u32),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Draft creation, editing and submission for portal users.
pub struct OrderService<S> {
    store: Arc<S>,
    resolver: RequirementsResolver<S>,
    clock: Arc<dyn Clock>,
    number_retries: u32,
}

impl<S> OrderService<S>
where
    S: CatalogRepository + CustomerRepository + OrderRepository + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let resolver = RequirementsResolver::new(Arc::clone(&store));
        Self {
            store,
            resolver,
            clock,
            number_retries: DEFAULT_NUMBER_RETRIES,
        }
    }

    pub fn with_number_retries(mut self, retries: u32) -> Self {
        self.number_retries = retries.max(1);
        self
    }

    /// Always creates a new draft with a freshly allocated order number.
    pub fn create_draft(&self, actor: &Actor, draft: DraftOrder) -> Result<Order, OrderError> {
        let (items, subject, notes) = self.validated(actor, draft)?;
        let now = self.clock.now();
        let day = now.date_naive();
        let code = customer_code_for(&actor.customer_id);

        for attempt in 1..=self.number_retries {
            let sequence = self.store.next_order_sequence(&actor.customer_id, day)?;
            let order = Order {
                id: Uuid::new_v4(),
                order_number: format_order_number(day, &code, sequence),
                customer_id: actor.customer_id,
                user_id: actor.user_id,
                status: OrderStatus::Draft,
                subject: subject.clone(),
                items: items.clone(),
                notes: notes.clone(),
                created_at: now,
                updated_at: now,
                updated_by: Some(actor.user_id),
                submitted_at: None,
            };

            match self.store.insert_order(order) {
                Ok(stored) => {
                    info!(
                        order = %stored.id,
                        order_number = %stored.order_number,
                        customer = %stored.customer_id,
                        "draft order created"
                    );
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(attempt, customer = %actor.customer_id, "order number collision, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(OrderError::NumberExhausted(self.number_retries))
    }

    /// Replaces the contents of a draft the actor's customer owns.
    pub fn update_draft(
        &self,
        actor: &Actor,
        order_id: &Uuid,
        draft: DraftOrder,
    ) -> Result<Order, OrderError> {
        let mut order = self
            .store
            .order(order_id)?
            .filter(|order| order.customer_id == actor.customer_id && order.is_draft())
            .ok_or(OrderError::NotFoundOrSubmitted)?;
        let (items, subject, notes) = self.validated(actor, draft)?;

        order.items = items;
        order.subject = subject;
        order.notes = notes;
        order.updated_at = self.clock.now();
        order.updated_by = Some(actor.user_id);

        let stored = self.store.replace_draft(order).map_err(|err| match err {
            RepositoryError::NotFound => OrderError::NotFoundOrSubmitted,
            other => other.into(),
        })?;
        info!(order = %stored.id, "draft order updated");
        Ok(stored)
    }

    /// Moves a draft to submitted exactly once.
    pub fn submit(&self, actor: &Actor, order_id: &Uuid) -> Result<Order, OrderError> {
        let now = self.clock.now();
        let submitted = self
            .store
            .submit_draft(order_id, &actor.customer_id, &actor.user_id, now)
            .map_err(|err| match err {
                RepositoryError::NotFound => OrderError::NotFoundOrSubmitted,
                other => other.into(),
            })?;

        info!(
            order = %submitted.id,
            order_number = %submitted.order_number,
            user = %actor.user_id,
            "order submitted"
        );
        Ok(submitted)
    }

    pub fn get(&self, actor: &Actor, order_id: &Uuid) -> Result<Order, OrderError> {
        self.store
            .order(order_id)?
            .filter(|order| order.customer_id == actor.customer_id)
            .ok_or(OrderError::NotFound)
    }

    pub fn list(&self, actor: &Actor) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.orders_for_customer(&actor.customer_id)?)
    }

    pub fn stats(&self, actor: &Actor) -> Result<OrderStats, OrderError> {
        let today = self.clock.now().date_naive();
        let orders = self.store.orders_for_customer(&actor.customer_id)?;

        let mut stats = OrderStats {
            total: orders.len(),
            ..OrderStats::default()
        };
        for order in &orders {
            match order.status {
                OrderStatus::Draft => stats.draft += 1,
                OrderStatus::Submitted => stats.submitted += 1,
            }
            if within_day(order.created_at, today) {
                stats.created_today += 1;
            }
        }
        Ok(stats)
    }

    fn validated(
        &self,
        actor: &Actor,
        draft: DraftOrder,
    ) -> Result<(Vec<ServiceLocation>, Subject, Option<String>), OrderError> {
        let DraftOrder {
            items,
            subject,
            notes,
        } = draft;

        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        let subject = subject.unwrap_or_default();
        let missing = subject.missing_names();
        if !missing.is_empty() {
            return Err(OrderError::MissingSubjectFields(missing));
        }

        let customer = self
            .store
            .customer(&actor.customer_id)?
            .ok_or(OrderError::CustomerNotFound(actor.customer_id))?;
        if customer.disabled {
            return Err(OrderError::CustomerDisabled(customer.id));
        }

        self.resolver.validate_selection(&items)?;

        let notes = notes
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok((items, subject, notes))
    }
}
