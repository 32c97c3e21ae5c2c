//! MongoDB Index Initialization
//!
//! The unique indexes are the authoritative arbiter of the uniqueness
//! invariants, so they must exist before the platform takes writes.

use bson::{doc, Document};
use mongodb::{options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::audit::entity::AUDIT_LOGS_COLLECTION;
use crate::membership::entity::{Membership, ROLE_ID_FIELD};
use crate::role::entity::Role;
use crate::usecase::{Aggregate, UniqueKey};
use crate::user::entity::User;

/// Create every index the platform relies on. Idempotent.
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_unique_indexes::<Role>(db).await?;
    create_unique_indexes::<User>(db).await?;
    create_unique_indexes::<Membership>(db).await?;
    create_membership_lookup_index(db).await?;
    create_audit_log_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

/// Index model for a unique key, named so duplicate-key errors can be traced back to it.
pub fn unique_index_model(key: &UniqueKey) -> IndexModel {
    let mut keys = Document::new();
    for field in key.fields {
        keys.insert(*field, 1);
    }

    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(key.index.to_string())
                .unique(true)
                .build(),
        )
        .build()
}

async fn create_unique_indexes<T: Aggregate>(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<Document>(T::collection_name());
    for key in T::unique_keys() {
        collection.create_index(unique_index_model(key)).await?;
    }

    info!(collection = T::collection_name(), "Created unique indexes");
    Ok(())
}

async fn create_membership_lookup_index(db: &Database) -> Result<(), mongodb::error::Error> {
    let mut keys = Document::new();
    keys.insert(ROLE_ID_FIELD, 1);

    db.collection::<Document>(Membership::collection_name())
        .create_index(
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name("user_roles_role_id".to_string())
                        .build(),
                )
                .build(),
        )
        .await?;
    Ok(())
}

async fn create_audit_log_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let audit_logs = db.collection::<Document>(AUDIT_LOGS_COLLECTION);

    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "entityId": 1, "performedAt": 1 })
                .build(),
        )
        .await?;

    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "performedAt": -1 })
                .build(),
        )
        .await?;

    info!("Created indexes on audit_logs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_index_model_uses_key_name() {
        let model = unique_index_model(&Membership::unique_keys()[0]);

        assert_eq!(model.keys, doc! { "userId": 1, "roleId": 1 });
        let options = model.options.unwrap();
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.name.as_deref(), Some("user_roles_user_role_unique"));
    }

    #[test]
    fn test_every_aggregate_declares_unique_keys() {
        assert_eq!(Role::unique_keys().len(), 1);
        assert_eq!(User::unique_keys().len(), 2);
        assert_eq!(Membership::unique_keys().len(), 1);
    }
}
