//! Audit Log Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::entity::{AuditLog, AUDIT_LOGS_COLLECTION};
use crate::shared::error::Result;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Audit rows for one entity, oldest first.
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Vec<AuditLog>>;
}

pub struct MongoAuditLogRepository {
    collection: Collection<AuditLog>,
}

impl MongoAuditLogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(AUDIT_LOGS_COLLECTION),
        }
    }
}

#[async_trait]
impl AuditLogRepository for MongoAuditLogRepository {
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Vec<AuditLog>> {
        let cursor = self
            .collection
            .find(doc! { "entityId": entity_id })
            .sort(doc! { "performedAt": 1, "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
