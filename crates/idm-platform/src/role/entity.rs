//! Role Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::membership::entity::{MEMBERSHIPS_COLLECTION, ROLE_ID_FIELD};
use crate::shared::fresh_stamp;
use crate::shared::tsid::TsidGenerator;
use crate::usecase::{Aggregate, Cascade, UniqueKey};

pub const ROLES_COLLECTION: &str = "roles";

const ROLE_UNIQUE_KEYS: &[UniqueKey] = &[UniqueKey {
    index: "roles_normalized_name_unique",
    fields: &["normalizedName"],
    code: "ROLE_NAME_EXISTS",
    message: "duplicate role name",
}];

const ROLE_CASCADES: &[Cascade] = &[Cascade {
    collection: MEMBERSHIPS_COLLECTION,
    foreign_key: ROLE_ID_FIELD,
}];

/// A named role. Roles are never renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Upper-cased name; carries the unique index.
    pub normalized_name: String,

    pub concurrency_stamp: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Role {
    /// New role with a fresh id. `name` is stored trimmed.
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            id: TsidGenerator::generate(),
            normalized_name: Self::normalize(&name),
            name,
            concurrency_stamp: fresh_stamp(),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    pub fn with_created_by(mut self, principal_id: impl Into<String>) -> Self {
        self.created_by = Some(principal_id.into());
        self
    }

    /// Key used for case-insensitive uniqueness.
    pub fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }

    pub fn summary(&self) -> RoleSummary {
        RoleSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl Aggregate for Role {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        ROLES_COLLECTION
    }

    fn entity_type() -> &'static str {
        "Role"
    }

    fn unique_keys() -> &'static [UniqueKey] {
        ROLE_UNIQUE_KEYS
    }

    fn cascades() -> &'static [Cascade] {
        ROLE_CASCADES
    }
}

/// `(id, name)` projection returned by role listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
}

/// A role with the usernames of its members, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}
