use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    /// Present on subaccounts; master accounts leave it empty.
    #[serde(default)]
    pub master_account_id: Option<Uuid>,
    #[serde(default)]
    pub billing_account_id: Option<Uuid>,
    #[serde(default)]
    pub disabled: bool,
}

impl Customer {
    pub fn is_master(&self) -> bool {
        self.master_account_id.is_none()
    }
}
