//! Persistence seams shared by the feature modules.

mod memory;
mod seed;

pub use memory::MemoryStore;
pub use seed::{Seed, SeedError, SeedSession};

use crate::access::SessionRepository;
use crate::catalog::CatalogRepository;
use crate::customers::CustomerRepository;
use crate::orders::OrderRepository;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Every repository the HTTP surface needs, satisfied by one backing store.
pub trait Store:
    CatalogRepository + CustomerRepository + OrderRepository + SessionRepository + 'static
{
}

impl<T> Store for T where
    T: CatalogRepository + CustomerRepository + OrderRepository + SessionRepository + 'static
{
}
