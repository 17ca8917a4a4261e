//! Draft-to-submitted order workflow and order numbering.

pub mod domain;
pub mod numbering;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{DraftOrder, Order, OrderStats, OrderStatus, Subject};
pub use repository::OrderRepository;
pub use router::portal_router;
pub use service::{OrderError, OrderService};
