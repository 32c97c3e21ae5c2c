//! Audit Log Entity
//!
//! One row per successful mutation, written in the same transaction as the change.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shared::tsid::TsidGenerator;
use crate::usecase::DomainEvent;

pub const AUDIT_LOGS_COLLECTION: &str = "audit_logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: String,

    /// "Role", "User" or "Membership"
    pub entity_type: String,

    pub entity_id: String,

    /// Command type name, e.g. "CreateRoleCommand"
    pub operation: String,

    /// Serialized command. Credential fields are never serialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    pub event_type: String,

    pub principal_id: String,

    pub correlation_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    /// Build the audit row for `command`, which produced `event` on `entity_id`.
    pub fn for_commit<E, C>(entity_type: &str, entity_id: &str, event: &E, command: &C) -> Self
    where
        E: DomainEvent,
        C: Serialize,
    {
        let operation = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        let operation_json = match serde_json::to_string(command) {
            Ok(json) => Some(json),
            Err(err) => {
                warn!(
                    operation = %operation,
                    entity_id,
                    error = %err,
                    "Command not serializable, audit row has no payload"
                );
                None
            }
        };

        Self {
            id: TsidGenerator::generate(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            operation,
            operation_json,
            event_type: event.event_type().to_string(),
            principal_id: event.principal_id().to_string(),
            correlation_id: event.correlation_id().to_string(),
            performed_at: event.time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::{EventMetadata, ExecutionContext};

    #[derive(Serialize)]
    struct RenameThingCommand {
        name: String,
    }

    #[derive(Serialize)]
    struct ThingRenamed {
        metadata: EventMetadata,
    }

    crate::impl_domain_event!(ThingRenamed);

    #[test]
    fn test_for_commit_captures_command_and_event() {
        let ctx = ExecutionContext::system();
        let event = ThingRenamed {
            metadata: EventMetadata::from_context(&ctx, "thing", "renamed", "T1"),
        };
        let command = RenameThingCommand {
            name: "new".to_string(),
        };

        let log = AuditLog::for_commit("Thing", "T1", &event, &command);

        assert_eq!(log.operation, "RenameThingCommand");
        assert_eq!(log.operation_json.as_deref(), Some(r#"{"name":"new"}"#));
        assert_eq!(log.event_type, "idm:thing:renamed");
        assert_eq!(log.principal_id, "system");
        assert_eq!(log.correlation_id, ctx.correlation_id);
        assert_eq!(log.performed_at, event.metadata.time);
    }

    #[derive(Serialize)]
    struct TagThingCommand {
        tags: std::collections::HashMap<(u8, u8), String>,
    }

    #[test]
    fn test_unserializable_command_still_audited() {
        let ctx = ExecutionContext::system();
        let event = ThingRenamed {
            metadata: EventMetadata::from_context(&ctx, "thing", "tagged", "T2"),
        };
        let command = TagThingCommand {
            tags: [((1, 2), "pair".to_string())].into_iter().collect(),
        };

        let log = AuditLog::for_commit("Thing", "T2", &event, &command);

        assert_eq!(log.operation, "TagThingCommand");
        assert!(log.operation_json.is_none());
        assert_eq!(log.event_type, "idm:thing:tagged");
    }
}
