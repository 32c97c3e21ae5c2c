//! Role Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::role::entity::Role;
use crate::usecase::{EventMetadata, ExecutionContext};

/// Event emitted when a new role is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role_id: String,
    pub name: String,
}

impl_domain_event!(RoleCreated);

impl RoleCreated {
    pub fn new(ctx: &ExecutionContext, role: &Role) -> Self {
        Self {
            metadata: EventMetadata::from_context(ctx, "role", "created", &role.id),
            role_id: role.id.clone(),
            name: role.name.clone(),
        }
    }
}

/// Event emitted when a role and its memberships are deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub role_id: String,
    pub name: String,
}

impl_domain_event!(RoleDeleted);

impl RoleDeleted {
    pub fn new(ctx: &ExecutionContext, role: &Role) -> Self {
        Self {
            metadata: EventMetadata::from_context(ctx, "role", "deleted", &role.id),
            role_id: role.id.clone(),
            name: role.name.clone(),
        }
    }
}
