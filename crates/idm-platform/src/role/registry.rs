//! Role Registry
//!
//! Entry point for role reads and role mutations. Reads are open to every
//! caller; mutations go through admin-gated use cases.

use std::sync::Arc;

use tracing::debug;

use super::entity::{RoleDetail, RoleSummary};
use super::operations::{
    CreateRoleCommand, CreateRoleUseCase, DeleteRoleCommand, DeleteRoleUseCase, RoleCreated,
    RoleDeleted,
};
use super::repository::RoleRepository;
use crate::details;
use crate::membership::operations::{AssignRoleCommand, AssignRoleUseCase, RoleAssigned};
use crate::membership::repository::MembershipRepository;
use crate::membership::resolver::MembershipResolver;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::repository::UserRepository;

pub struct RoleRegistry<U: UnitOfWork> {
    role_repo: Arc<dyn RoleRepository>,
    resolver: Arc<MembershipResolver>,
    create: CreateRoleUseCase<U>,
    delete: DeleteRoleUseCase<U>,
    assign: AssignRoleUseCase<U>,
}

impl<U: UnitOfWork> RoleRegistry<U> {
    pub fn new(
        role_repo: Arc<dyn RoleRepository>,
        user_repo: Arc<dyn UserRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        resolver: Arc<MembershipResolver>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            create: CreateRoleUseCase::new(role_repo.clone(), unit_of_work.clone()),
            delete: DeleteRoleUseCase::new(role_repo.clone(), unit_of_work.clone()),
            assign: AssignRoleUseCase::new(
                user_repo,
                role_repo.clone(),
                membership_repo,
                unit_of_work,
            ),
            role_repo,
            resolver,
        }
    }

    /// Every role as `(id, name)`, ascending by name.
    pub async fn list_roles(&self) -> Result<Vec<RoleSummary>, UseCaseError> {
        let roles = self.role_repo.find_all_ordered().await?;
        debug!(count = roles.len(), "Listed roles");
        Ok(roles.iter().map(|role| role.summary()).collect())
    }

    /// The role named exactly `name`, with its current members.
    pub async fn get_role_detail(&self, name: &str) -> Result<RoleDetail, UseCaseError> {
        let role = self.role_repo.find_by_name(name).await?.ok_or_else(|| {
            UseCaseError::not_found_with_details(
                "ROLE_NOT_FOUND",
                format!("role '{}' not found", name),
                details! { "name" => name },
            )
        })?;

        let members = self.resolver.members_of(&role).await?;
        Ok(RoleDetail {
            id: role.id,
            name: role.name,
            members,
        })
    }

    pub async fn create_role(&self, name: &str, ctx: ExecutionContext) -> UseCaseResult<RoleCreated> {
        self.create
            .execute(CreateRoleCommand { name: name.to_string() }, ctx)
            .await
    }

    pub async fn delete_role(&self, name: &str, ctx: ExecutionContext) -> UseCaseResult<RoleDeleted> {
        self.delete
            .execute(DeleteRoleCommand { name: name.to_string() }, ctx)
            .await
    }

    pub async fn assign_role(
        &self,
        username: &str,
        role_name: &str,
        ctx: ExecutionContext,
    ) -> UseCaseResult<RoleAssigned> {
        self.assign
            .execute(
                AssignRoleCommand {
                    username: username.to_string(),
                    role_name: role_name.to_string(),
                },
                ctx,
            )
            .await
    }
}
