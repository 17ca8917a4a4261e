//! Order intake, requirement resolution and access control for the
//! background-screening portal.

pub mod access;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod context;
pub mod customers;
pub mod error;
pub mod orders;
pub mod requirements;
pub mod store;
pub mod telemetry;

pub use context::{api_router, ServiceContext};
