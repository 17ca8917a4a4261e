//! Resolution of per-order requirements from selected services and locations.

mod resolver;
mod views;


pub use resolver::{CatalogEntity, RequirementsResolver, ResolveError};
pub use views::{
    RequiredSource, RequirementsResolution, ResolvedRequirement, SearchItemRequirements,
    ServiceLocation,
};
