//! Assign Role Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::events::RoleAssigned;
use crate::details;
use crate::membership::entity::Membership;
use crate::membership::repository::MembershipRepository;
use crate::role::repository::RoleRepository;
use crate::shared::authorization::AuthorizationGate;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleCommand {
    pub username: String,
    pub role_name: String,
}

/// Admin-gated. The insert is reference-guarded, so a role deleted
/// concurrently never ends up with a dangling membership.
pub struct AssignRoleUseCase<U: UnitOfWork> {
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    unit_of_work: Arc<U>,
    gate: AuthorizationGate,
}

impl<U: UnitOfWork> AssignRoleUseCase<U> {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        role_repo: Arc<dyn RoleRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            membership_repo,
            unit_of_work,
            gate: AuthorizationGate::admin(),
        }
    }

    pub async fn execute(
        &self,
        command: AssignRoleCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleAssigned> {
        if let Err(err) = self.gate.require(&ctx.caller, "assign-role") {
            return UseCaseResult::failure(err);
        }

        if command.username.trim().is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "USERNAME_REQUIRED",
                "username is required",
            ));
        }
        if command.role_name.trim().is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "ROLE_NAME_REQUIRED",
                "role name is required",
            ));
        }

        let user = match self
            .user_repo
            .find_by_normalized_username(&User::normalize(&command.username))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "USER_NOT_FOUND",
                    format!("user '{}' not found", command.username.trim()),
                    details! { "username" => command.username },
                ));
            }
            Err(err) => return UseCaseResult::failure(err.into()),
        };

        let role = match self.role_repo.find_by_name(&command.role_name).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "ROLE_NOT_FOUND",
                    format!("role '{}' not found", command.role_name),
                    details! { "name" => command.role_name },
                ));
            }
            Err(err) => return UseCaseResult::failure(err.into()),
        };

        match self.membership_repo.find(&user.id, &role.id).await {
            Ok(Some(_)) => {
                return UseCaseResult::failure(UseCaseError::conflict(
                    "ROLE_ALREADY_ASSIGNED",
                    "role already assigned",
                ));
            }
            Ok(None) => {}
            Err(err) => return UseCaseResult::failure(err.into()),
        }

        let membership = Membership::new(&user.id, &role.id).with_assigned_by(ctx.principal_id());
        let event = RoleAssigned::new(&ctx, &membership, &user.username, &role.name);

        let result = self.unit_of_work.commit(&membership, event, &command).await;
        if result.is_success() {
            info!(
                user_id = %user.id,
                role_id = %role.id,
                principal_id = ctx.principal_id(),
                "Role assigned"
            );
        }
        result
    }
}
