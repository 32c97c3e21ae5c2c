//! Create Role Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::events::RoleCreated;
use crate::details;
use crate::role::entity::Role;
use crate::role::repository::RoleRepository;
use crate::shared::authorization::AuthorizationGate;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleCommand {
    pub name: String,
}

/// Admin-gated. Role names are unique ignoring case.
pub struct CreateRoleUseCase<U: UnitOfWork> {
    role_repo: Arc<dyn RoleRepository>,
    unit_of_work: Arc<U>,
    gate: AuthorizationGate,
}

impl<U: UnitOfWork> CreateRoleUseCase<U> {
    pub fn new(role_repo: Arc<dyn RoleRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            role_repo,
            unit_of_work,
            gate: AuthorizationGate::admin(),
        }
    }

    pub async fn execute(
        &self,
        command: CreateRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleCreated> {
        if let Err(err) = self.gate.require(&ctx.caller, "create-role") {
            return UseCaseResult::failure(err);
        }

        let name = command.name.trim();
        if name.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "ROLE_NAME_REQUIRED",
                "role name is required",
            ));
        }

        // Advisory; the unique index on normalizedName decides races.
        match self.role_repo.find_by_normalized_name(&Role::normalize(name)).await {
            Ok(Some(existing)) => {
                return UseCaseResult::failure(UseCaseError::conflict_with_details(
                    "ROLE_NAME_EXISTS",
                    "duplicate role name",
                    details! { "name" => name, "existing" => existing.name },
                ));
            }
            Ok(None) => {}
            Err(err) => return UseCaseResult::failure(err.into()),
        }

        let role = Role::new(name).with_created_by(ctx.principal_id());
        let event = RoleCreated::new(&ctx, &role);

        let result = self.unit_of_work.commit(&role, event, &command).await;
        if result.is_success() {
            info!(role_id = %role.id, name = %role.name, principal_id = ctx.principal_id(), "Role created");
        }
        result
    }
}
