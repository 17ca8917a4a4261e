//! Customer accounts and their master/subaccount hierarchy.

pub mod domain;
pub mod hierarchy;
pub mod repository;
pub mod router;

pub use domain::Customer;
pub use hierarchy::{
    hierarchy_violations, orphaned_subaccounts, reconcile_orphans, HierarchyViolation,
};
pub use repository::CustomerRepository;
pub use router::customer_router;
