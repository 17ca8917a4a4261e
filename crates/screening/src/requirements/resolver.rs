use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::views::{
    RequiredSource, RequirementsResolution, ResolvedRequirement, SearchItemRequirements,
    ServiceLocation,
};
use crate::catalog::{
    display_order_warnings, CatalogRepository, CollectionTab, DataQualityWarning, LocationMapping,
    Requirement, ServiceRequirement,
};
use crate::store::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntity {
    Service,
    Location,
}

impl fmt::Display for CatalogEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogEntity::Service => write!(f, "service"),
            CatalogEntity::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("at least one service/location pair is required")]
    EmptySelection,
    #[error("{entity} not found for pair (service {}, location {})", .pair.service_id, .pair.location_id)]
    NotFound {
        pair: ServiceLocation,
        entity: CatalogEntity,
    },
    #[error("{entity} is disabled for pair (service {}, location {})", .pair.service_id, .pair.location_id)]
    Disabled {
        pair: ServiceLocation,
        entity: CatalogEntity,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Location override, then the service-level flag, then the requirement default.
pub(crate) fn effective_required(
    requirement: &Requirement,
    link: &ServiceRequirement,
    mapping: Option<&LocationMapping>,
) -> (bool, RequiredSource) {
    if let Some(mapping) = mapping {
        return (mapping.is_required, RequiredSource::LocationOverride);
    }
    if let Some(is_required) = link.is_required {
        return (is_required, RequiredSource::Service);
    }
    (
        requirement.payload.required_by_default(),
        RequiredSource::RequirementDefault,
    )
}

/// Turns order selections into the fields and documents the wizard collects.
pub struct RequirementsResolver<C> {
    catalog: Arc<C>,
}

impl<C> Clone for RequirementsResolver<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C> RequirementsResolver<C>
where
    C: CatalogRepository + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Checks every pair up front so a bad pair rejects the whole request.
    pub fn validate_selection(&self, selection: &[ServiceLocation]) -> Result<(), ResolveError> {
        if selection.is_empty() {
            return Err(ResolveError::EmptySelection);
        }

        for pair in selection {
            let service = self
                .catalog
                .service(&pair.service_id)?
                .ok_or(ResolveError::NotFound {
                    pair: *pair,
                    entity: CatalogEntity::Service,
                })?;
            let location = self
                .catalog
                .location(&pair.location_id)?
                .ok_or(ResolveError::NotFound {
                    pair: *pair,
                    entity: CatalogEntity::Location,
                })?;

            if service.disabled {
                return Err(ResolveError::Disabled {
                    pair: *pair,
                    entity: CatalogEntity::Service,
                });
            }
            if location.disabled {
                return Err(ResolveError::Disabled {
                    pair: *pair,
                    entity: CatalogEntity::Location,
                });
            }
        }

        Ok(())
    }

    pub fn resolve(
        &self,
        selection: &[ServiceLocation],
    ) -> Result<RequirementsResolution, ResolveError> {
        self.validate_selection(selection)?;

        let mut subject: Vec<(usize, ResolvedRequirement)> = Vec::new();
        let mut subject_index: HashMap<Uuid, usize> = HashMap::new();
        let mut search_items = Vec::new();
        let mut warnings = Vec::new();
        let mut seen_pairs: HashSet<ServiceLocation> = HashSet::new();
        let mut audited_services: HashSet<Uuid> = HashSet::new();
        let mut sequence = 0usize;

        for pair in selection {
            if !seen_pairs.insert(*pair) {
                continue;
            }

            let links = self.catalog.service_requirements(&pair.service_id)?;
            let first_visit = audited_services.insert(pair.service_id);
            if first_visit {
                warnings.extend(display_order_warnings(pair.service_id, &links));
            }

            let mut fields = Vec::new();
            for link in &links {
                let Some(requirement) = self.catalog.requirement(&link.requirement_id)? else {
                    if first_visit {
                        warnings.push(DataQualityWarning::MissingRequirement {
                            service_id: pair.service_id,
                            requirement_id: link.requirement_id,
                        });
                    }
                    continue;
                };
                if requirement.disabled {
                    continue;
                }

                let mapping = self.catalog.location_mapping(
                    &pair.service_id,
                    &pair.location_id,
                    &requirement.id,
                )?;
                let (is_required, source) =
                    effective_required(&requirement, link, mapping.as_ref());

                match requirement.payload.collection_tab() {
                    CollectionTab::Subject => match subject_index.get(&requirement.id) {
                        Some(&position) => {
                            let existing = &mut subject[position].1;
                            if is_required && !existing.is_required {
                                existing.is_required = true;
                                existing.required_source = source;
                            }
                        }
                        None => {
                            subject_index.insert(requirement.id, subject.len());
                            subject.push((
                                sequence,
                                ResolvedRequirement::new(&requirement, link, is_required, source),
                            ));
                        }
                    },
                    CollectionTab::Search => fields.push(ResolvedRequirement::new(
                        &requirement,
                        link,
                        is_required,
                        source,
                    )),
                }
                sequence += 1;
            }

            search_items.push(SearchItemRequirements {
                service_id: pair.service_id,
                location_id: pair.location_id,
                fields,
            });
        }

        subject.sort_by_key(|(sequence, field)| (field.display_order, *sequence));

        for warning in &warnings {
            warn!(%warning, "requirement catalog data-quality warning");
        }

        Ok(RequirementsResolution {
            subject_fields: subject.into_iter().map(|(_, field)| field).collect(),
            search_items,
            warnings,
        })
    }
}
