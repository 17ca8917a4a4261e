use uuid::Uuid;

use super::domain::{Location, LocationMapping, Requirement, Service, ServiceRequirement};
use crate::store::RepositoryError;

/// Read-mostly access to locations, services and their requirement wiring.
pub trait CatalogRepository: Send + Sync {
    fn location(&self, id: &Uuid) -> Result<Option<Location>, RepositoryError>;
    fn locations(&self) -> Result<Vec<Location>, RepositoryError>;
    /// Matches either ISO code, ignoring case.
    fn location_by_code(&self, code: &str) -> Result<Option<Location>, RepositoryError>;
    /// Fails with `Conflict` on a code collision and `NotFound` for an unknown parent.
    fn insert_location(&self, location: Location) -> Result<Location, RepositoryError>;
    fn toggle_location_disabled(&self, id: &Uuid) -> Result<Location, RepositoryError>;

    fn service(&self, id: &Uuid) -> Result<Option<Service>, RepositoryError>;
    fn services(&self) -> Result<Vec<Service>, RepositoryError>;
    fn toggle_service_disabled(&self, id: &Uuid) -> Result<Service, RepositoryError>;

    fn requirement(&self, id: &Uuid) -> Result<Option<Requirement>, RepositoryError>;
    /// Ordered by display order, ties kept in creation order.
    fn service_requirements(
        &self,
        service_id: &Uuid,
    ) -> Result<Vec<ServiceRequirement>, RepositoryError>;
    fn all_service_requirements(&self) -> Result<Vec<ServiceRequirement>, RepositoryError>;
    fn location_mapping(
        &self,
        service_id: &Uuid,
        location_id: &Uuid,
        requirement_id: &Uuid,
    ) -> Result<Option<LocationMapping>, RepositoryError>;
}
