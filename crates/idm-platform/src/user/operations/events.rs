//! User Domain Events

use serde::{Deserialize, Serialize};

use crate::impl_domain_event;
use crate::usecase::{EventMetadata, ExecutionContext};
use crate::user::entity::User;

/// Event emitted when an account is registered. Carries no credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistered {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub username: String,
    pub email: String,
}

impl_domain_event!(UserRegistered);

impl UserRegistered {
    pub fn new(ctx: &ExecutionContext, user: &User) -> Self {
        Self {
            metadata: EventMetadata::from_context(ctx, "user", "registered", &user.id),
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
