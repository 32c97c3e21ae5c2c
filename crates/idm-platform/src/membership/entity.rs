//! Membership Entity
//!
//! The user-to-role relation, one row per pair.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::entity::ROLES_COLLECTION;
use crate::shared::tsid::TsidGenerator;
use crate::usecase::{Aggregate, Reference, UniqueKey};
use crate::user::entity::USERS_COLLECTION;

pub const MEMBERSHIPS_COLLECTION: &str = "user_roles";
pub const USER_ID_FIELD: &str = "userId";
pub const ROLE_ID_FIELD: &str = "roleId";

const MEMBERSHIP_UNIQUE_KEYS: &[UniqueKey] = &[UniqueKey {
    index: "user_roles_user_role_unique",
    fields: &[USER_ID_FIELD, ROLE_ID_FIELD],
    code: "ROLE_ALREADY_ASSIGNED",
    message: "role already assigned",
}];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,

    pub role_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub assigned_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<String>,
}

impl Membership {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            id: TsidGenerator::generate(),
            user_id: user_id.into(),
            role_id: role_id.into(),
            assigned_at: Utc::now(),
            assigned_by: None,
        }
    }

    pub fn with_assigned_by(mut self, principal_id: impl Into<String>) -> Self {
        self.assigned_by = Some(principal_id.into());
        self
    }
}

impl Aggregate for Membership {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        MEMBERSHIPS_COLLECTION
    }

    fn entity_type() -> &'static str {
        "Membership"
    }

    fn unique_keys() -> &'static [UniqueKey] {
        MEMBERSHIP_UNIQUE_KEYS
    }

    /// Both ends must be live when the row is written.
    fn references(&self) -> Vec<Reference> {
        vec![
            Reference {
                collection: USERS_COLLECTION,
                id: self.user_id.clone(),
            },
            Reference {
                collection: ROLES_COLLECTION,
                id: self.role_id.clone(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_references_user_and_role() {
        let membership = Membership::new("U1", "R1");
        let refs = membership.references();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], Reference { collection: "users", id: "U1".to_string() });
        assert_eq!(refs[1], Reference { collection: "roles", id: "R1".to_string() });
    }

    #[test]
    fn test_bson_field_names_match_constants() {
        let doc = bson::to_document(&Membership::new("U1", "R1").with_assigned_by("admin-1")).unwrap();

        assert_eq!(doc.get_str(USER_ID_FIELD).unwrap(), "U1");
        assert_eq!(doc.get_str(ROLE_ID_FIELD).unwrap(), "R1");
        assert_eq!(doc.get_str("assignedBy").unwrap(), "admin-1");
    }
}
