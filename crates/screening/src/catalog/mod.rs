//! Reference data: locations, services, requirements and their linkage.

pub mod audit;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;

pub use audit::{audit_display_order, display_order_warnings, DataQualityWarning};
pub use domain::{
    CollectionTab, Location, LocationMapping, Requirement, RequirementKind, RequirementPayload,
    Service, ServiceRequirement, UNASSIGNED_DISPLAY_ORDER,
};
pub use import::{import_locations, ImportError, ImportSummary};
pub use repository::CatalogRepository;
pub use router::catalog_router;
