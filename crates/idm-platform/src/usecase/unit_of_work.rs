//! Unit of Work
//!
//! Atomic commit of an aggregate change, its cascades and reference guards,
//! and the audit log row, inside one MongoDB transaction.

use async_trait::async_trait;
use bson::{doc, to_document, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, ClientSession, Database};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;
use crate::audit::entity::{AuditLog, AUDIT_LOGS_COLLECTION};
use crate::details;
use crate::shared::error::StoreError;
use crate::shared::fresh_stamp;

const DUPLICATE_KEY_CODE: i32 = 11000;
const WRITE_CONFLICT_CODE: i32 = 112;

/// A unique index and the conflict reported when it is violated.
#[derive(Debug, Clone, Copy)]
pub struct UniqueKey {
    /// Index name, shared with index creation and duplicate-key translation.
    pub index: &'static str,
    pub fields: &'static [&'static str],
    pub code: &'static str,
    pub message: &'static str,
}

impl UniqueKey {
    pub fn conflict(&self) -> UseCaseError {
        UseCaseError::conflict(self.code, self.message)
    }
}

/// Dependent rows removed together with an aggregate.
#[derive(Debug, Clone, Copy)]
pub struct Cascade {
    pub collection: &'static str,
    pub foreign_key: &'static str,
}

/// A row that must still exist when the aggregate is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub collection: &'static str,
    pub id: String,
}

/// Persistable aggregate root.
pub trait Aggregate: Serialize + Send + Sync {
    fn id(&self) -> &str;

    fn collection_name() -> &'static str;

    /// Entity type recorded in audit rows.
    fn entity_type() -> &'static str;

    fn unique_keys() -> &'static [UniqueKey] {
        &[]
    }

    fn cascades() -> &'static [Cascade] {
        &[]
    }

    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Atomic write boundary. The only producer of a successful `UseCaseResult`.
///
/// ```ignore
/// let role = Role::new(&command.name);
/// let event = RoleCreated::new(&ctx, &role);
/// self.unit_of_work.commit(&role, event, &command).await
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Insert a new aggregate with its audit row.
    ///
    /// Referenced rows get a fresh concurrency stamp in the same transaction;
    /// a missing reference fails with `NotFoundError`. A unique index
    /// violation fails with the matching `ConflictError`.
    async fn commit<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync;

    /// Delete an aggregate, every cascaded dependent row and write the audit row.
    async fn commit_delete<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync;
}

/// Conflict for a duplicate-key failure reported against `index`.
pub(crate) fn conflict_for_index(keys: &[UniqueKey], index: &str) -> UseCaseError {
    keys.iter()
        .find(|key| index.contains(key.index))
        .map(UniqueKey::conflict)
        .unwrap_or_else(|| UseCaseError::conflict("DUPLICATE_KEY", "duplicate key"))
}

pub(crate) fn reference_missing(reference: &Reference) -> UseCaseError {
    UseCaseError::not_found_with_details(
        "REFERENCE_NOT_FOUND",
        format!("referenced record in '{}' no longer exists", reference.collection),
        details! { "collection" => reference.collection, "id" => reference.id },
    )
}

pub(crate) fn aggregate_missing<T: Aggregate>(aggregate: &T) -> UseCaseError {
    UseCaseError::not_found_with_details(
        "ENTITY_NOT_FOUND",
        format!("{} no longer exists", T::entity_type()),
        details! { "id" => aggregate.id() },
    )
}

pub(crate) fn concurrent_modification() -> UseCaseError {
    UseCaseError::conflict("CONCURRENT_MODIFICATION", "concurrent modification")
}

fn duplicate_key_message(err: &mongodb::error::Error) -> Option<String> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(write_error.message.clone())
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            Some(command_error.message.clone())
        }
        _ => None,
    }
}

/// Only a server-reported write conflict. Network and server-selection
/// failures also carry `TransientTransactionError` and stay store failures.
fn is_write_conflict(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command_error) if command_error.code == WRITE_CONFLICT_CODE
    )
}

/// Map a driver error to the use case taxonomy.
fn translate(err: mongodb::error::Error, keys: &[UniqueKey]) -> UseCaseError {
    if let Some(message) = duplicate_key_message(&err) {
        debug!(%message, "Unique index rejected write");
        return conflict_for_index(keys, &message);
    }
    if is_write_conflict(&err) {
        warn!(error = %err, "Transaction write conflict");
        return concurrent_modification();
    }
    StoreError::from(err).into()
}

/// MongoDB implementation using multi-document transactions.
///
/// Needs a replica set deployment.
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    async fn begin(&self) -> Result<ClientSession, UseCaseError> {
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(StoreError::from)?;
        session
            .start_transaction()
            .await
            .map_err(StoreError::from)?;
        Ok(session)
    }

    async fn finish<E: DomainEvent>(
        mut session: ClientSession,
        outcome: Result<(), UseCaseError>,
        event: E,
    ) -> UseCaseResult<E> {
        if let Err(err) = outcome {
            if let Err(abort_err) = session.abort_transaction().await {
                warn!(error = %abort_err, "Failed to abort transaction");
            }
            return UseCaseResult::failure(err);
        }

        if let Err(err) = session.commit_transaction().await {
            return UseCaseResult::failure(translate(err, &[]));
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            "Committed transaction"
        );
        UseCaseResult::success(event)
    }

    async fn insert_within<E, T, C>(
        &self,
        session: &mut ClientSession,
        aggregate: &T,
        event: &E,
        command: &C,
    ) -> Result<(), UseCaseError>
    where
        E: DomainEvent,
        T: Aggregate,
        C: Serialize,
    {
        let document = to_document(aggregate).map_err(StoreError::from)?;

        for reference in aggregate.references() {
            let touched = self
                .database
                .collection::<Document>(reference.collection)
                .update_one(
                    doc! { "_id": &reference.id },
                    doc! { "$set": { "concurrencyStamp": fresh_stamp() } },
                )
                .session(&mut *session)
                .await
                .map_err(|e| translate(e, &[]))?;
            if touched.matched_count == 0 {
                return Err(reference_missing(&reference));
            }
        }

        self.database
            .collection::<Document>(T::collection_name())
            .insert_one(document)
            .session(&mut *session)
            .await
            .map_err(|e| translate(e, T::unique_keys()))?;

        let audit_log = AuditLog::for_commit(T::entity_type(), aggregate.id(), event, command);
        self.insert_audit(session, &audit_log).await
    }

    async fn delete_within<E, T, C>(
        &self,
        session: &mut ClientSession,
        aggregate: &T,
        event: &E,
        command: &C,
    ) -> Result<(), UseCaseError>
    where
        E: DomainEvent,
        T: Aggregate,
        C: Serialize,
    {
        for cascade in T::cascades() {
            let mut filter = Document::new();
            filter.insert(cascade.foreign_key, aggregate.id());

            let removed = self
                .database
                .collection::<Document>(cascade.collection)
                .delete_many(filter)
                .session(&mut *session)
                .await
                .map_err(|e| translate(e, &[]))?;
            debug!(
                collection = cascade.collection,
                removed = removed.deleted_count,
                "Cascaded delete"
            );
        }

        let deleted = self
            .database
            .collection::<Document>(T::collection_name())
            .delete_one(doc! { "_id": aggregate.id() })
            .session(&mut *session)
            .await
            .map_err(|e| translate(e, &[]))?;
        if deleted.deleted_count == 0 {
            return Err(aggregate_missing(aggregate));
        }

        let audit_log = AuditLog::for_commit(T::entity_type(), aggregate.id(), event, command);
        self.insert_audit(session, &audit_log).await
    }

    async fn insert_audit(
        &self,
        session: &mut ClientSession,
        audit_log: &AuditLog,
    ) -> Result<(), UseCaseError> {
        self.database
            .collection::<AuditLog>(AUDIT_LOGS_COLLECTION)
            .insert_one(audit_log)
            .session(&mut *session)
            .await
            .map_err(|e| translate(e, &[]))?;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    async fn commit<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.begin().await {
            Ok(session) => session,
            Err(err) => return UseCaseResult::failure(err),
        };
        let outcome = self.insert_within(&mut session, aggregate, &event, command).await;
        Self::finish(session, outcome, event).await
    }

    async fn commit_delete<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.begin().await {
            Ok(session) => session,
            Err(err) => return UseCaseResult::failure(err),
        };
        let outcome = self.delete_within(&mut session, aggregate, &event, command).await;
        Self::finish(session, outcome, event).await
    }
}
