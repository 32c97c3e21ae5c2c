//! Membership Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::membership::entity::{Membership, MEMBERSHIPS_COLLECTION};
use crate::shared::error::Result;

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_by_role(&self, role_id: &str) -> Result<Vec<Membership>>;

    async fn find(&self, user_id: &str, role_id: &str) -> Result<Option<Membership>>;

    async fn count_by_role(&self, role_id: &str) -> Result<u64>;
}

pub struct MongoMembershipRepository {
    collection: Collection<Membership>,
}

impl MongoMembershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(MEMBERSHIPS_COLLECTION),
        }
    }
}

#[async_trait]
impl MembershipRepository for MongoMembershipRepository {
    async fn find_by_role(&self, role_id: &str) -> Result<Vec<Membership>> {
        let cursor = self.collection.find(doc! { "roleId": role_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find(&self, user_id: &str, role_id: &str) -> Result<Option<Membership>> {
        Ok(self
            .collection
            .find_one(doc! { "userId": user_id, "roleId": role_id })
            .await?)
    }

    async fn count_by_role(&self, role_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "roleId": role_id })
            .await?)
    }
}
