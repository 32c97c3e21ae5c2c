//! User Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::fresh_stamp;
use crate::shared::tsid::TsidGenerator;
use crate::usecase::{Aggregate, UniqueKey};

pub const USERS_COLLECTION: &str = "users";

/// Email is checked before username, so the email key comes first.
const USER_UNIQUE_KEYS: &[UniqueKey] = &[
    UniqueKey {
        index: "users_normalized_email_unique",
        fields: &["normalizedEmail"],
        code: "EMAIL_EXISTS",
        message: "duplicate email",
    },
    UniqueKey {
        index: "users_normalized_username_unique",
        fields: &["normalizedUsername"],
        code: "USERNAME_EXISTS",
        message: "duplicate username",
    },
];

/// A registered account.
///
/// `password_hash` is the opaque stored credential. It is never part of a
/// read projection; use [`UserSummary`] for anything handed to callers.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,
    pub normalized_username: String,

    pub email: String,
    pub normalized_email: String,

    pub password_hash: String,

    /// Random per-user token, regenerated on credential changes.
    pub security_stamp: String,

    pub concurrency_stamp: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New user with a fresh id and security stamp. Username and email are stored trimmed.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        let username = username.trim().to_string();
        let email = email.trim().to_string();
        Self {
            id: TsidGenerator::generate(),
            normalized_username: Self::normalize(&username),
            username,
            normalized_email: Self::normalize(&email),
            email,
            password_hash,
            security_stamp: fresh_stamp(),
            concurrency_stamp: fresh_stamp(),
            created_at: Utc::now(),
        }
    }

    /// Key used for case-insensitive username and email comparison.
    pub fn normalize(value: &str) -> String {
        value.trim().to_uppercase()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Aggregate for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        USERS_COLLECTION
    }

    fn entity_type() -> &'static str {
        "User"
    }

    fn unique_keys() -> &'static [UniqueKey] {
        USER_UNIQUE_KEYS
    }
}

/// `(id, username, email)` projection. Carries no credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}
