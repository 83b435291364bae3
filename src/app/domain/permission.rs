use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Enumerated capability. Never persisted; derived from role via `rbac`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    ManageOrganization,
    ManageBilling,
    ManageMembers,
    CreateStore,
    DeleteStore,
    ManageStoreSettings,
    ViewDashboard,
}
