//! Delete Role Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::events::RoleDeleted;
use crate::details;
use crate::role::repository::RoleRepository;
use crate::shared::authorization::AuthorizationGate;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleCommand {
    pub name: String,
}

/// Admin-gated. Removes the role and every membership of it in one commit.
pub struct DeleteRoleUseCase<U: UnitOfWork> {
    role_repo: Arc<dyn RoleRepository>,
    unit_of_work: Arc<U>,
    gate: AuthorizationGate,
}

impl<U: UnitOfWork> DeleteRoleUseCase<U> {
    pub fn new(role_repo: Arc<dyn RoleRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            role_repo,
            unit_of_work,
            gate: AuthorizationGate::admin(),
        }
    }

    pub async fn execute(
        &self,
        command: DeleteRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleDeleted> {
        if let Err(err) = self.gate.require(&ctx.caller, "delete-role") {
            return UseCaseResult::failure(err);
        }

        let role = match self.role_repo.find_by_name(&command.name).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "ROLE_NOT_FOUND",
                    format!("role '{}' not found", command.name),
                    details! { "name" => command.name },
                ));
            }
            Err(err) => return UseCaseResult::failure(err.into()),
        };

        let event = RoleDeleted::new(&ctx, &role);

        let result = self.unit_of_work.commit_delete(&role, event, &command).await;
        if result.is_success() {
            info!(role_id = %role.id, name = %role.name, principal_id = ctx.principal_id(), "Role deleted");
        }
        result
    }
}
