//! Membership Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::membership::entity::Membership;
use crate::usecase::{EventMetadata, ExecutionContext};

/// Event emitted when a user is granted a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssigned {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub membership_id: String,
    pub user_id: String,
    pub username: String,
    pub role_id: String,
    pub role_name: String,
}

impl_domain_event!(RoleAssigned);

impl RoleAssigned {
    pub fn new(
        ctx: &ExecutionContext,
        membership: &Membership,
        username: &str,
        role_name: &str,
    ) -> Self {
        Self {
            metadata: EventMetadata::from_context(ctx, "membership", "assigned", &membership.id),
            membership_id: membership.id.clone(),
            user_id: membership.user_id.clone(),
            username: username.to_string(),
            role_id: membership.role_id.clone(),
            role_name: role_name.to_string(),
        }
    }
}
