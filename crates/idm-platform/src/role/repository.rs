//! Role Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::role::entity::{Role, ROLES_COLLECTION};
use crate::shared::error::Result;

/// Read access to roles. Writes go through the unit of work.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>>;

    /// Exact, case-sensitive name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;

    async fn find_by_normalized_name(&self, normalized_name: &str) -> Result<Option<Role>>;

    /// All roles ordered ascending by name (binary collation).
    async fn find_all_ordered(&self) -> Result<Vec<Role>>;
}

pub struct MongoRoleRepository {
    collection: Collection<Role>,
}

impl MongoRoleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ROLES_COLLECTION),
        }
    }
}

#[async_trait]
impl RoleRepository for MongoRoleRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.collection.find_one(doc! { "name": name }).await?)
    }

    async fn find_by_normalized_name(&self, normalized_name: &str) -> Result<Option<Role>> {
        Ok(self
            .collection
            .find_one(doc! { "normalizedName": normalized_name })
            .await?)
    }

    async fn find_all_ordered(&self) -> Result<Vec<Role>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1, "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
