//! Platform wiring
//!
//! Builds the registry, directory and resolver over one identity store.

use std::sync::Arc;

use mongodb::{Client, Database};

use crate::auth::CredentialHasher;
use crate::membership::repository::{MembershipRepository, MongoMembershipRepository};
use crate::membership::resolver::MembershipResolver;
use crate::role::registry::RoleRegistry;
use crate::role::repository::{MongoRoleRepository, RoleRepository};
use crate::shared::memory_store::InMemoryIdentityStore;
use crate::usecase::{MongoUnitOfWork, UnitOfWork};
use crate::user::directory::UserDirectory;
use crate::user::repository::{MongoUserRepository, UserRepository};

pub struct IdentityPlatform<U: UnitOfWork> {
    pub roles: RoleRegistry<U>,
    pub users: UserDirectory<U>,
    pub memberships: Arc<MembershipResolver>,
}

impl<U: UnitOfWork> IdentityPlatform<U> {
    pub fn new(
        role_repo: Arc<dyn RoleRepository>,
        user_repo: Arc<dyn UserRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        hasher: Arc<dyn CredentialHasher>,
        unit_of_work: Arc<U>,
    ) -> Self {
        let memberships = Arc::new(MembershipResolver::new(
            role_repo.clone(),
            user_repo.clone(),
            membership_repo.clone(),
        ));

        Self {
            roles: RoleRegistry::new(
                role_repo,
                user_repo.clone(),
                membership_repo,
                memberships.clone(),
                unit_of_work.clone(),
            ),
            users: UserDirectory::new(user_repo, hasher, unit_of_work),
            memberships,
        }
    }
}

impl IdentityPlatform<MongoUnitOfWork> {
    /// Platform over MongoDB. The deployment must be a replica set.
    pub fn mongo(client: Client, db: Database, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self::new(
            Arc::new(MongoRoleRepository::new(&db)),
            Arc::new(MongoUserRepository::new(&db)),
            Arc::new(MongoMembershipRepository::new(&db)),
            hasher,
            Arc::new(MongoUnitOfWork::new(client, db)),
        )
    }
}

impl IdentityPlatform<InMemoryIdentityStore> {
    pub fn in_memory(store: Arc<InMemoryIdentityStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), hasher, store)
    }
}
