//! Register User Use Case
//!
//! Open to any caller. Email uniqueness is checked before username uniqueness,
//! and both before the credential is hashed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::events::UserRegistered;
use crate::auth::CredentialHasher;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserCommand {
    pub username: String,
    pub email: String,

    /// Plaintext; never serialized into audit rows.
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub struct RegisterUserUseCase<U: UnitOfWork> {
    user_repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> RegisterUserUseCase<U> {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: RegisterUserCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<UserRegistered> {
        let username = command.username.trim();
        if username.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "USERNAME_REQUIRED",
                "username is required",
            ));
        }

        let email = command.email.trim();
        if email.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "EMAIL_REQUIRED",
                "email is required",
            ));
        }

        if command.password.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "PASSWORD_REQUIRED",
                "password is required",
            ));
        }

        match self.user_repo.find_by_normalized_email(&User::normalize(email)).await {
            Ok(Some(_)) => {
                return UseCaseResult::failure(UseCaseError::conflict("EMAIL_EXISTS", "duplicate email"));
            }
            Ok(None) => {}
            Err(err) => return UseCaseResult::failure(err.into()),
        }

        match self.user_repo.find_by_normalized_username(&User::normalize(username)).await {
            Ok(Some(_)) => {
                return UseCaseResult::failure(UseCaseError::conflict(
                    "USERNAME_EXISTS",
                    "duplicate username",
                ));
            }
            Ok(None) => {}
            Err(err) => return UseCaseResult::failure(err.into()),
        }

        let password_hash = match self.hasher.hash_credential(&command.password) {
            Ok(hash) => hash,
            Err(err) => return UseCaseResult::failure(err.into()),
        };

        let user = User::new(username, email, password_hash);
        let event = UserRegistered::new(&ctx, &user);

        let result = self.unit_of_work.commit(&user, event, &command).await;
        if result.is_success() {
            info!(user_id = %user.id, username = %user.username, "User registered");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Config, PasswordPolicy, PasswordService};
    use crate::shared::memory_store::InMemoryIdentityStore;

    fn use_case(store: &Arc<InMemoryIdentityStore>) -> RegisterUserUseCase<InMemoryIdentityStore> {
        let policy = PasswordPolicy {
            min_length: 6,
            ..PasswordPolicy::default()
        };
        let hasher = PasswordService::new(Argon2Config::testing(), policy).unwrap();
        RegisterUserUseCase::new(store.clone(), Arc::new(hasher), store.clone())
    }

    fn command(username: &str, email: &str, password: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_registers_with_hashed_credential() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let event = use_case(&store)
            .execute(command("alice", "a@x.com", "secret"), ExecutionContext::anonymous())
            .await
            .unwrap();

        let user = store.find_by_normalized_username("ALICE").await.unwrap().unwrap();
        assert_eq!(user.id, event.user_id);
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "secret");
    }

    #[tokio::test]
    async fn test_required_fields() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let uc = use_case(&store);

        for (cmd, code) in [
            (command(" ", "a@x.com", "secret"), "USERNAME_REQUIRED"),
            (command("alice", "", "secret"), "EMAIL_REQUIRED"),
            (command("alice", "a@x.com", ""), "PASSWORD_REQUIRED"),
        ] {
            let err = uc.execute(cmd, ExecutionContext::anonymous()).await.unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.code(), code);
        }
    }

    #[tokio::test]
    async fn test_short_password_violates_policy() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let err = use_case(&store)
            .execute(command("alice", "a@x.com", "abc"), ExecutionContext::anonymous())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PASSWORD_POLICY");
        assert_eq!(store.row_count("users"), 0);
    }

    #[tokio::test]
    async fn test_email_conflict_wins_over_username_conflict() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let uc = use_case(&store);
        uc.execute(command("alice", "a@x.com", "secret"), ExecutionContext::anonymous())
            .await
            .unwrap();

        let err = uc
            .execute(command("ALICE", "A@X.COM", "secret"), ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "EMAIL_EXISTS");

        let err = uc
            .execute(command("Alice", "other@x.com", "secret"), ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "USERNAME_EXISTS");
    }

    #[test]
    fn test_password_never_serialized() {
        let cmd = command("alice", "a@x.com", "hunter22");
        assert!(!serde_json::to_string(&cmd).unwrap().contains("hunter22"));
        assert!(!format!("{:?}", cmd).contains("hunter22"));
    }
}
