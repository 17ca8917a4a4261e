use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display order assigned to service requirements that were never placed.
pub const UNASSIGNED_DISPLAY_ORDER: u32 = 999;

fn unassigned_display_order() -> u32 {
    UNASSIGNED_DISPLAY_ORDER
}

/// Country or subregion. Subregions point at their country through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub code2: String,
    pub code3: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub disabled: bool,
}

impl Location {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Case-insensitive match against either ISO code.
    pub fn has_code(&self, code: &str) -> bool {
        self.code2.eq_ignore_ascii_case(code) || self.code3.eq_ignore_ascii_case(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Where the order wizard collects a requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionTab {
    /// Collected once per order, about the person being screened.
    Subject,
    /// Collected for every service/location item on the order.
    #[default]
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Field,
    Document,
    Form,
}

impl RequirementKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Document => "document",
            Self::Form => "form",
        }
    }
}

/// Type-specific requirement metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementPayload {
    #[serde(rename_all = "camelCase")]
    Field {
        data_type: String,
        label: String,
        #[serde(default)]
        collection_tab: CollectionTab,
        #[serde(default)]
        required_by_default: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Document {
        label: String,
        #[serde(default)]
        collection_tab: CollectionTab,
        #[serde(default)]
        required_by_default: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Form {
        label: String,
        #[serde(default)]
        collection_tab: CollectionTab,
        #[serde(default)]
        required_by_default: bool,
        #[serde(default)]
        fields: Vec<String>,
    },
}

impl RequirementPayload {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Self::Field { .. } => RequirementKind::Field,
            Self::Document { .. } => RequirementKind::Document,
            Self::Form { .. } => RequirementKind::Form,
        }
    }

    pub fn collection_tab(&self) -> CollectionTab {
        match self {
            Self::Field { collection_tab, .. }
            | Self::Document { collection_tab, .. }
            | Self::Form { collection_tab, .. } => *collection_tab,
        }
    }

    pub fn required_by_default(&self) -> bool {
        match self {
            Self::Field {
                required_by_default,
                ..
            }
            | Self::Document {
                required_by_default,
                ..
            }
            | Self::Form {
                required_by_default,
                ..
            } => *required_by_default,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Field { label, .. } | Self::Document { label, .. } | Self::Form { label, .. } => {
                label
            }
        }
    }

    pub fn data_type(&self) -> Option<&str> {
        match self {
            Self::Field { data_type, .. } => Some(data_type),
            Self::Document { .. } | Self::Form { .. } => None,
        }
    }

    pub fn instructions(&self) -> Option<&str> {
        match self {
            Self::Field { instructions, .. } | Self::Document { instructions, .. } => {
                instructions.as_deref()
            }
            Self::Form { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    pub payload: RequirementPayload,
}

/// Links a requirement to a service with its wizard position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequirement {
    pub id: Uuid,
    pub service_id: Uuid,
    pub requirement_id: Uuid,
    #[serde(default = "unassigned_display_order")]
    pub display_order: u32,
    /// Service-level required flag; `None` defers to the requirement default.
    #[serde(default)]
    pub is_required: Option<bool>,
}

impl ServiceRequirement {
    pub fn order_unassigned(&self) -> bool {
        self.display_order == UNASSIGNED_DISPLAY_ORDER
    }
}

/// Per-location override of whether a service requirement is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMapping {
    pub id: Uuid,
    pub requirement_id: Uuid,
    pub service_id: Uuid,
    pub location_id: Uuid,
    pub is_required: bool,
}
