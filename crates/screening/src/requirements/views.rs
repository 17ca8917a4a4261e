use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{DataQualityWarning, Requirement, RequirementKind, ServiceRequirement};

/// One service ordered for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLocation {
    pub service_id: Uuid,
    pub location_id: Uuid,
}

impl ServiceLocation {
    pub fn new(service_id: Uuid, location_id: Uuid) -> Self {
        Self {
            service_id,
            location_id,
        }
    }
}

/// Which layer decided the effective required flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredSource {
    LocationOverride,
    Service,
    RequirementDefault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRequirement {
    pub requirement_id: Uuid,
    pub name: String,
    pub kind: RequirementKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub display_order: u32,
    /// The display order is the unassigned sentinel.
    pub order_unassigned: bool,
    pub is_required: bool,
    pub required_source: RequiredSource,
}

impl ResolvedRequirement {
    pub(crate) fn new(
        requirement: &Requirement,
        link: &ServiceRequirement,
        is_required: bool,
        required_source: RequiredSource,
    ) -> Self {
        Self {
            requirement_id: requirement.id,
            name: requirement.name.clone(),
            kind: requirement.payload.kind(),
            label: requirement.payload.label().to_string(),
            data_type: requirement.payload.data_type().map(str::to_string),
            instructions: requirement.payload.instructions().map(str::to_string),
            display_order: link.display_order,
            order_unassigned: link.order_unassigned(),
            is_required,
            required_source,
        }
    }
}

/// Search-level requirements for a single order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemRequirements {
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub fields: Vec<ResolvedRequirement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsResolution {
    pub subject_fields: Vec<ResolvedRequirement>,
    pub search_items: Vec<SearchItemRequirements>,
    pub warnings: Vec<DataQualityWarning>,
}

impl RequirementsResolution {
    pub fn search_item(&self, pair: &ServiceLocation) -> Option<&SearchItemRequirements> {
        self.search_items
            .iter()
            .find(|item| item.service_id == pair.service_id && item.location_id == pair.location_id)
    }
}
