//! In-memory identity store
//!
//! Implements every repository trait and `UnitOfWork` over BSON documents, with
//! the same unique keys, cascades and reference guards as the MongoDB store.
//! Each commit runs inside one critical section. Used by tests and by embedders
//! that do not need persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::Document;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::audit::entity::{AuditLog, AUDIT_LOGS_COLLECTION};
use crate::audit::repository::AuditLogRepository;
use crate::membership::entity::{Membership, MEMBERSHIPS_COLLECTION};
use crate::membership::repository::MembershipRepository;
use crate::role::entity::{Role, ROLES_COLLECTION};
use crate::role::repository::RoleRepository;
use crate::shared::error::{Result, StoreError};
use crate::shared::fresh_stamp;
use crate::usecase::unit_of_work::{aggregate_missing, conflict_for_index, reference_missing};
use crate::usecase::{Aggregate, DomainEvent, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::entity::{User, USERS_COLLECTION};
use crate::user::repository::UserRepository;

type Rows = BTreeMap<String, Document>;

#[derive(Default)]
pub struct InMemoryIdentityStore {
    collections: Mutex<HashMap<&'static str, Rows>>,
    unavailable: AtomicBool,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read and write fail with a store error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of rows currently held in `collection`.
    pub fn row_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, |rows| rows.len())
    }

    /// Every audit row, oldest first.
    pub fn audit_logs(&self) -> Result<Vec<AuditLog>> {
        let mut logs: Vec<AuditLog> = self.read(AUDIT_LOGS_COLLECTION, |_| true)?;
        logs.sort_by(|a, b| a.performed_at.cmp(&b.performed_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store switched off"));
        }
        Ok(())
    }

    fn read<T, F>(&self, collection: &str, predicate: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&Document) -> bool,
    {
        self.ensure_available()?;
        let matching: Vec<Document> = self
            .collections
            .lock()
            .get(collection)
            .map(|rows| rows.values().filter(|row| predicate(*row)).cloned().collect())
            .unwrap_or_default();

        matching
            .into_iter()
            .map(|row| bson::from_document(row).map_err(StoreError::from))
            .collect()
    }

    fn read_one<T, F>(&self, collection: &str, predicate: F) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&Document) -> bool,
    {
        Ok(self.read(collection, predicate)?.into_iter().next())
    }

    fn insert_now<E, T, C>(&self, aggregate: &T, event: &E, command: &C) -> std::result::Result<(), UseCaseError>
    where
        E: DomainEvent,
        T: Aggregate,
        C: Serialize,
    {
        self.ensure_available()?;
        let document = bson::to_document(aggregate).map_err(StoreError::from)?;
        let audit_log = AuditLog::for_commit(T::entity_type(), aggregate.id(), event, command);
        let audit_id = audit_log.id.clone();
        let audit_document = bson::to_document(&audit_log).map_err(StoreError::from)?;

        let mut collections = self.collections.lock();

        let references = aggregate.references();
        for reference in &references {
            let live = collections
                .get(reference.collection)
                .is_some_and(|rows| rows.contains_key(&reference.id));
            if !live {
                return Err(reference_missing(reference));
            }
        }

        let rows = collections.entry(T::collection_name()).or_default();
        if rows.contains_key(aggregate.id()) {
            return Err(conflict_for_index(T::unique_keys(), "_id_"));
        }
        if let Some(key) = T::unique_keys()
            .iter()
            .find(|key| rows.values().any(|row| same_key(row, &document, key.fields)))
        {
            return Err(key.conflict());
        }
        rows.insert(aggregate.id().to_string(), document);

        for reference in &references {
            if let Some(row) = collections
                .get_mut(reference.collection)
                .and_then(|rows| rows.get_mut(&reference.id))
            {
                row.insert("concurrencyStamp", fresh_stamp());
            }
        }

        collections
            .entry(AUDIT_LOGS_COLLECTION)
            .or_default()
            .insert(audit_id, audit_document);
        Ok(())
    }

    fn delete_now<E, T, C>(&self, aggregate: &T, event: &E, command: &C) -> std::result::Result<(), UseCaseError>
    where
        E: DomainEvent,
        T: Aggregate,
        C: Serialize,
    {
        self.ensure_available()?;
        let audit_log = AuditLog::for_commit(T::entity_type(), aggregate.id(), event, command);
        let audit_id = audit_log.id.clone();
        let audit_document = bson::to_document(&audit_log).map_err(StoreError::from)?;

        let mut collections = self.collections.lock();

        let present = collections
            .get(T::collection_name())
            .is_some_and(|rows| rows.contains_key(aggregate.id()));
        if !present {
            return Err(aggregate_missing(aggregate));
        }

        for cascade in T::cascades() {
            if let Some(rows) = collections.get_mut(cascade.collection) {
                let before = rows.len();
                rows.retain(|_, row| !field_equals(row, cascade.foreign_key, aggregate.id()));
                debug!(
                    collection = cascade.collection,
                    removed = before - rows.len(),
                    "Cascaded delete"
                );
            }
        }

        if let Some(rows) = collections.get_mut(T::collection_name()) {
            rows.remove(aggregate.id());
        }

        collections
            .entry(AUDIT_LOGS_COLLECTION)
            .or_default()
            .insert(audit_id, audit_document);
        Ok(())
    }
}

fn field_equals(row: &Document, field: &str, value: &str) -> bool {
    matches!(row.get_str(field), Ok(v) if v == value)
}

fn same_key(existing: &Document, candidate: &Document, fields: &[&str]) -> bool {
    fields.iter().all(|field| match (existing.get(field), candidate.get(field)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    })
}

#[async_trait]
impl UnitOfWork for InMemoryIdentityStore {
    async fn commit<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync,
    {
        match self.insert_now(aggregate, &event, command) {
            Ok(()) => {
                debug!(event_type = event.event_type(), "Committed in-memory insert");
                UseCaseResult::success(event)
            }
            Err(err) => UseCaseResult::failure(err),
        }
    }

    async fn commit_delete<E, T, C>(&self, aggregate: &T, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Aggregate,
        C: Serialize + Send + Sync,
    {
        match self.delete_now(aggregate, &event, command) {
            Ok(()) => {
                debug!(event_type = event.event_type(), "Committed in-memory delete");
                UseCaseResult::success(event)
            }
            Err(err) => UseCaseResult::failure(err),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryIdentityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>> {
        self.read_one(ROLES_COLLECTION, |row| field_equals(row, "_id", id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.read_one(ROLES_COLLECTION, |row| field_equals(row, "name", name))
    }

    async fn find_by_normalized_name(&self, normalized_name: &str) -> Result<Option<Role>> {
        self.read_one(ROLES_COLLECTION, |row| {
            field_equals(row, "normalizedName", normalized_name)
        })
    }

    async fn find_all_ordered(&self) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self.read(ROLES_COLLECTION, |_| true)?;
        roles.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(roles)
    }
}

#[async_trait]
impl UserRepository for InMemoryIdentityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.read_one(USERS_COLLECTION, |row| field_equals(row, "_id", id))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        self.read(USERS_COLLECTION, |row| {
            ids.iter().any(|id| field_equals(row, "_id", id))
        })
    }

    async fn find_by_normalized_username(&self, normalized_username: &str) -> Result<Option<User>> {
        self.read_one(USERS_COLLECTION, |row| {
            field_equals(row, "normalizedUsername", normalized_username)
        })
    }

    async fn find_by_normalized_email(&self, normalized_email: &str) -> Result<Option<User>> {
        self.read_one(USERS_COLLECTION, |row| {
            field_equals(row, "normalizedEmail", normalized_email)
        })
    }

    async fn find_all_ordered(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read(USERS_COLLECTION, |_| true)?;
        users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryIdentityStore {
    async fn find_by_role(&self, role_id: &str) -> Result<Vec<Membership>> {
        self.read(MEMBERSHIPS_COLLECTION, |row| field_equals(row, "roleId", role_id))
    }

    async fn find(&self, user_id: &str, role_id: &str) -> Result<Option<Membership>> {
        self.read_one(MEMBERSHIPS_COLLECTION, |row| {
            field_equals(row, "userId", user_id) && field_equals(row, "roleId", role_id)
        })
    }

    async fn count_by_role(&self, role_id: &str) -> Result<u64> {
        self.ensure_available()?;
        let count = self
            .collections
            .lock()
            .get(MEMBERSHIPS_COLLECTION)
            .map_or(0, |rows| {
                rows.values()
                    .filter(|row| field_equals(row, "roleId", role_id))
                    .count()
            });
        Ok(count as u64)
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryIdentityStore {
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Vec<AuditLog>> {
        let mut logs: Vec<AuditLog> =
            self.read(AUDIT_LOGS_COLLECTION, |row| field_equals(row, "entityId", entity_id))?;
        logs.sort_by(|a, b| a.performed_at.cmp(&b.performed_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }
}
