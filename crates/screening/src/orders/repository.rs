use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::domain::Order;
use crate::store::RepositoryError;

/// Storage abstraction for orders and their per-day numbering counters.
pub trait OrderRepository: Send + Sync {
    /// Fails with `Conflict` when the id or order number is already taken.
    fn insert_order(&self, order: Order) -> Result<Order, RepositoryError>;
    fn order(&self, id: &Uuid) -> Result<Option<Order>, RepositoryError>;
    /// Newest first.
    fn orders_for_customer(&self, customer_id: &Uuid) -> Result<Vec<Order>, RepositoryError>;
    /// Atomically bumps the customer's counter for `day` and returns the new
    /// value. A missing counter starts from the orders already created that day.
    fn next_order_sequence(&self, customer_id: &Uuid, day: NaiveDate)
        -> Result<u32, RepositoryError>;
    /// Replaces a stored draft owned by `order.customer_id`; `NotFound` otherwise.
    fn replace_draft(&self, order: Order) -> Result<Order, RepositoryError>;
    /// Draft to submitted as a single check-and-set; `NotFound` when the order
    /// is missing, owned by another customer, or already submitted.
    fn submit_draft(
        &self,
        id: &Uuid,
        customer_id: &Uuid,
        submitted_by: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError>;
}
