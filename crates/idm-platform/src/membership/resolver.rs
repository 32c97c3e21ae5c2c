//! Membership Resolver
//!
//! Answers who holds a role. Always reads the store; nothing is cached.

use std::sync::Arc;

use crate::details;
use crate::membership::repository::MembershipRepository;
use crate::role::entity::Role;
use crate::role::repository::RoleRepository;
use crate::usecase::UseCaseError;
use crate::user::repository::UserRepository;

pub struct MembershipResolver {
    role_repo: Arc<dyn RoleRepository>,
    user_repo: Arc<dyn UserRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
}

impl MembershipResolver {
    pub fn new(
        role_repo: Arc<dyn RoleRepository>,
        user_repo: Arc<dyn UserRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            role_repo,
            user_repo,
            membership_repo,
        }
    }

    /// Usernames holding `role`, sorted ascending.
    pub async fn members_of(&self, role: &Role) -> Result<Vec<String>, UseCaseError> {
        let user_ids: Vec<String> = self
            .membership_repo
            .find_by_role(&role.id)
            .await?
            .into_iter()
            .map(|membership| membership.user_id)
            .collect();

        let mut usernames: Vec<String> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| user.username)
            .collect();
        usernames.sort();
        Ok(usernames)
    }

    /// Whether `user_id` holds the role named exactly `role_name`.
    ///
    /// An unknown role name is `NotFoundError`, not `false`.
    pub async fn is_member(&self, user_id: &str, role_name: &str) -> Result<bool, UseCaseError> {
        let role = self.role_repo.find_by_name(role_name).await?.ok_or_else(|| {
            UseCaseError::not_found_with_details(
                "ROLE_NOT_FOUND",
                format!("role '{}' not found", role_name),
                details! { "name" => role_name },
            )
        })?;

        Ok(self.membership_repo.find(user_id, &role.id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{Argon2Config, PasswordPolicy, PasswordService};
    use crate::platform::IdentityPlatform;
    use crate::shared::memory_store::InMemoryIdentityStore;
    use crate::usecase::ExecutionContext;
    use crate::user::repository::UserRepository;
    use std::sync::Arc;

    fn platform() -> (Arc<InMemoryIdentityStore>, IdentityPlatform<InMemoryIdentityStore>) {
        let store = Arc::new(InMemoryIdentityStore::new());
        let hasher = PasswordService::new(Argon2Config::testing(), PasswordPolicy::default()).unwrap();
        let platform = IdentityPlatform::in_memory(store.clone(), Arc::new(hasher));
        (store, platform)
    }

    #[test]
    fn test_is_member_unknown_role() {
        let (_store, platform) = platform();
        let err = tokio_test::block_on(platform.memberships.is_member("0USER", "Ghost")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.code(), "ROLE_NOT_FOUND");
    }

    #[test]
    fn test_is_member_is_exact_on_role_name() {
        let (store, platform) = platform();
        tokio_test::block_on(async {
            platform.roles.create_role("Ops", ExecutionContext::system()).await.unwrap();
            platform
                .users
                .register_user("alice", "a@x.com", "pw1", ExecutionContext::anonymous())
                .await
                .unwrap();
            let alice = store.find_by_normalized_username("ALICE").await.unwrap().unwrap();

            assert!(!platform.memberships.is_member(&alice.id, "Ops").await.unwrap());
            platform
                .roles
                .assign_role("alice", "Ops", ExecutionContext::system())
                .await
                .unwrap();

            assert!(platform.memberships.is_member(&alice.id, "Ops").await.unwrap());
            assert!(platform.memberships.is_member(&alice.id, "ops").await.unwrap_err().is_not_found());
        });
    }
}
