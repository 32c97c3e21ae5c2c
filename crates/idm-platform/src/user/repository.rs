//! User Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::shared::error::Result;
use crate::user::entity::{User, USERS_COLLECTION};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Users whose id is in `ids`, in no particular order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    async fn find_by_normalized_username(&self, normalized_username: &str) -> Result<Option<User>>;

    async fn find_by_normalized_email(&self, normalized_email: &str) -> Result<Option<User>>;

    /// All users ordered ascending by username.
    async fn find_all_ordered(&self) -> Result<Vec<User>>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_normalized_username(&self, normalized_username: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "normalizedUsername": normalized_username })
            .await?)
    }

    async fn find_by_normalized_email(&self, normalized_email: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "normalizedEmail": normalized_email })
            .await?)
    }

    async fn find_all_ordered(&self) -> Result<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "username": 1, "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
