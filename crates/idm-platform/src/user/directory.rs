//! User Directory

use std::sync::Arc;

use super::entity::UserSummary;
use super::operations::{RegisterUserCommand, RegisterUserUseCase, UserRegistered};
use super::repository::UserRepository;
use crate::auth::CredentialHasher;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

pub struct UserDirectory<U: UnitOfWork> {
    user_repo: Arc<dyn UserRepository>,
    register_user: RegisterUserUseCase<U>,
}

impl<U: UnitOfWork> UserDirectory<U> {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            register_user: RegisterUserUseCase::new(user_repo.clone(), hasher, unit_of_work),
            user_repo,
        }
    }

    /// Every user as `(id, username, email)`, ascending by username.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, UseCaseError> {
        let users = self.user_repo.find_all_ordered().await?;
        Ok(users.iter().map(|user| user.summary()).collect())
    }

    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        ctx: ExecutionContext,
    ) -> UseCaseResult<UserRegistered> {
        self.register_user
            .execute(
                RegisterUserCommand {
                    username: username.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                },
                ctx,
            )
            .await
    }
}
