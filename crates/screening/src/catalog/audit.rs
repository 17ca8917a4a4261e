use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::domain::ServiceRequirement;
use super::repository::CatalogRepository;
use crate::store::RepositoryError;

/// Catalog problems surfaced to operators instead of being silently trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    #[serde(rename_all = "camelCase")]
    UnassignedDisplayOrder {
        service_id: Uuid,
        requirement_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    DuplicateDisplayOrder {
        service_id: Uuid,
        display_order: u32,
        requirement_ids: Vec<Uuid>,
    },
    #[serde(rename_all = "camelCase")]
    MissingRequirement {
        service_id: Uuid,
        requirement_id: Uuid,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::UnassignedDisplayOrder {
                service_id,
                requirement_id,
            } => write!(
                f,
                "service {service_id}: requirement {requirement_id} has no display order assigned"
            ),
            DataQualityWarning::DuplicateDisplayOrder {
                service_id,
                display_order,
                requirement_ids,
            } => write!(
                f,
                "service {service_id}: display order {display_order} shared by {} requirements",
                requirement_ids.len()
            ),
            DataQualityWarning::MissingRequirement {
                service_id,
                requirement_id,
            } => write!(
                f,
                "service {service_id}: linked requirement {requirement_id} does not exist"
            ),
        }
    }
}

/// Display-order findings for the links of a single service.
pub fn display_order_warnings(
    service_id: Uuid,
    links: &[ServiceRequirement],
) -> Vec<DataQualityWarning> {
    let mut warnings = Vec::new();
    let mut by_order: BTreeMap<u32, Vec<Uuid>> = BTreeMap::new();

    for link in links.iter().filter(|link| link.service_id == service_id) {
        if link.order_unassigned() {
            warnings.push(DataQualityWarning::UnassignedDisplayOrder {
                service_id,
                requirement_id: link.requirement_id,
            });
        } else {
            by_order
                .entry(link.display_order)
                .or_default()
                .push(link.requirement_id);
        }
    }

    for (display_order, requirement_ids) in by_order {
        if requirement_ids.len() > 1 {
            warnings.push(DataQualityWarning::DuplicateDisplayOrder {
                service_id,
                display_order,
                requirement_ids,
            });
        }
    }

    warnings
}

/// Scans every service requirement link in the catalog.
pub fn audit_display_order<C>(catalog: &C) -> Result<Vec<DataQualityWarning>, RepositoryError>
where
    C: CatalogRepository + ?Sized,
{
    let links = catalog.all_service_requirements()?;
    let services: BTreeSet<Uuid> = links.iter().map(|link| link.service_id).collect();

    let mut warnings = Vec::new();
    for service_id in services {
        warnings.extend(display_order_warnings(service_id, &links));
        for link in links.iter().filter(|link| link.service_id == service_id) {
            if catalog.requirement(&link.requirement_id)?.is_none() {
                warnings.push(DataQualityWarning::MissingRequirement {
                    service_id,
                    requirement_id: link.requirement_id,
                });
            }
        }
    }

    Ok(warnings)
}
