use uuid::Uuid;

use super::domain::Customer;
use crate::store::RepositoryError;

pub trait CustomerRepository: Send + Sync {
    fn customer(&self, id: &Uuid) -> Result<Option<Customer>, RepositoryError>;
    fn customers(&self) -> Result<Vec<Customer>, RepositoryError>;
    fn toggle_customer_disabled(&self, id: &Uuid) -> Result<Customer, RepositoryError>;
    /// Turns a subaccount back into a master account.
    fn clear_master_account(&self, id: &Uuid) -> Result<Customer, RepositoryError>;
}
