use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Areas of the application a user can be granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Customers,
    Services,
    Countries,
    Dsx,
    Workflows,
    Admin,
    Users,
    Orders,
}

impl Resource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Services => "services",
            Self::Countries => "countries",
            Self::Dsx => "dsx",
            Self::Workflows => "workflows",
            Self::Admin => "admin",
            Self::Users => "users",
            Self::Orders => "orders",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [
            Self::Customers,
            Self::Services,
            Self::Countries,
            Self::Dsx,
            Self::Workflows,
            Self::Admin,
            Self::Users,
            Self::Orders,
        ]
        .into_iter()
        .find(|resource| resource.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [Self::View, Self::Create, Self::Edit, Self::Delete]
            .into_iter()
            .find(|action| action.label() == label)
    }
}

/// What a user holds on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    All,
    Actions(BTreeSet<Action>),
    Scoped(BTreeSet<String>),
}

impl Grant {
    pub fn actions<I: IntoIterator<Item = Action>>(actions: I) -> Self {
        Self::Actions(actions.into_iter().collect())
    }

    pub fn scoped<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Scoped(ids.into_iter().map(Into::into).collect())
    }
}

/// Wire shape of a grant: `"*"`, `true`, `["view", "edit"]` or `{ "ids": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GrantRepr {
    Flag(bool),
    Wildcard(String),
    Actions(Vec<String>),
    Scoped { ids: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGrant {
    resource: Resource,
    detail: String,
}

impl fmt::Display for InvalidGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid grant for '{}': {}",
            self.resource.label(),
            self.detail
        )
    }
}

impl std::error::Error for InvalidGrant {}

/// Flat per-user permissions; no inheritance between resources or roles.
///
/// Resource keys and action names this build does not know are dropped with a
/// warning so that a dataset written for a newer release still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, GrantRepr>",
    into = "BTreeMap<String, GrantRepr>"
)]
pub struct PermissionSet {
    grants: BTreeMap<Resource, Grant>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: Resource, grant: Grant) -> Self {
        self.grants.insert(resource, grant);
        self
    }

    pub fn grant(&self, resource: Resource) -> Option<&Grant> {
        self.grants.get(&resource)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// True when the resource is granted and, if an action is named, the
    /// grant is a wildcard or lists that action.
    pub fn has_permission(&self, resource: Resource, action: Option<Action>) -> bool {
        match (self.grants.get(&resource), action) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(Grant::All), Some(_)) => true,
            (Some(Grant::Actions(actions)), Some(action)) => actions.contains(&action),
            (Some(Grant::Scoped(_)), Some(_)) => false,
        }
    }

    /// Whether a scoped (or wildcard) grant covers a specific record id.
    pub fn allows_id(&self, resource: Resource, id: &str) -> bool {
        match self.grants.get(&resource) {
            Some(Grant::All) => true,
            Some(Grant::Scoped(ids)) => ids.contains(id),
            Some(Grant::Actions(_)) | None => false,
        }
    }
}

impl TryFrom<BTreeMap<String, GrantRepr>> for PermissionSet {
    type Error = InvalidGrant;

    fn try_from(value: BTreeMap<String, GrantRepr>) -> Result<Self, Self::Error> {
        let mut grants = BTreeMap::new();
        for (key, repr) in value {
            let Some(resource) = Resource::from_label(&key) else {
                warn!(resource = %key, "ignoring grant on unknown resource");
                continue;
            };
            let grant = match repr {
                GrantRepr::Flag(true) => Grant::All,
                GrantRepr::Flag(false) => continue,
                GrantRepr::Wildcard(marker) if marker == "*" => Grant::All,
                GrantRepr::Wildcard(marker) => {
                    return Err(InvalidGrant {
                        resource,
                        detail: format!("unsupported marker '{marker}'"),
                    })
                }
                GrantRepr::Actions(names) => Grant::actions(names.iter().filter_map(|name| {
                    let action = Action::from_label(name);
                    if action.is_none() {
                        warn!(resource = resource.label(), action = %name, "ignoring unknown action");
                    }
                    action
                })),
                GrantRepr::Scoped { ids } => Grant::scoped(ids),
            };
            grants.insert(resource, grant);
        }
        Ok(Self { grants })
    }
}

impl From<PermissionSet> for BTreeMap<String, GrantRepr> {
    fn from(value: PermissionSet) -> Self {
        value
            .grants
            .into_iter()
            .map(|(resource, grant)| {
                let repr = match grant {
                    Grant::All => GrantRepr::Wildcard("*".to_string()),
                    Grant::Actions(actions) => GrantRepr::Actions(
                        actions
                            .into_iter()
                            .map(|action| action.label().to_string())
                            .collect(),
                    ),
                    Grant::Scoped(ids) => GrantRepr::Scoped {
                        ids: ids.into_iter().collect(),
                    },
                };
                (resource.label().to_string(), repr)
            })
            .collect()
    }
}
