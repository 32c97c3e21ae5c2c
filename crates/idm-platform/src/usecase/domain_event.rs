//! Domain Event Trait
//!
//! Facts produced by successful identity mutations. Event types follow
//! `idm:{aggregate}:{action}`, subjects follow `idm.{aggregate}.{id}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExecutionContext;
use crate::shared::tsid::TsidGenerator;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "idm:platform";

/// Base trait for all domain events.
pub trait DomainEvent: Send + Sync {
    /// Unique identifier for this event (TSID).
    fn event_id(&self) -> &str;

    /// `idm:{aggregate}:{action}`, e.g. `idm:role:created`.
    fn event_type(&self) -> &str;

    fn spec_version(&self) -> &str;

    fn source(&self) -> &str;

    /// `idm.{aggregate}.{id}`
    fn subject(&self) -> &str;

    fn time(&self) -> DateTime<Utc>;

    fn execution_id(&self) -> &str;

    fn correlation_id(&self) -> &str;

    fn causation_id(&self) -> Option<&str>;

    fn principal_id(&self) -> &str;

    /// Serialize the event payload to JSON.
    fn to_data_json(&self) -> String;
}

/// Common metadata embedded in every event as its `metadata` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub event_id: String,
    pub event_type: String,
    pub spec_version: String,
    pub source: String,
    pub subject: String,
    pub time: DateTime<Utc>,
    pub execution_id: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
}

impl EventMetadata {
    /// Metadata for an event about `aggregate` `id`, with tracing ids copied from `ctx`.
    pub fn from_context(
        ctx: &ExecutionContext,
        aggregate: &str,
        action: &str,
        id: &str,
    ) -> Self {
        Self {
            event_id: TsidGenerator::generate(),
            event_type: format!("idm:{}:{}", aggregate, action),
            spec_version: SPEC_VERSION.to_string(),
            source: SOURCE.to_string(),
            subject: format!("idm.{}.{}", aggregate, id),
            time: Utc::now(),
            execution_id: ctx.execution_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
            causation_id: ctx.causation_id.clone(),
            principal_id: ctx.principal_id().to_string(),
        }
    }
}

/// Implement `DomainEvent` by delegating to a `metadata: EventMetadata` field.
#[macro_export]
macro_rules! impl_domain_event {
    ($event_type:ty) => {
        impl $crate::usecase::DomainEvent for $event_type {
            fn event_id(&self) -> &str {
                &self.metadata.event_id
            }

            fn event_type(&self) -> &str {
                &self.metadata.event_type
            }

            fn spec_version(&self) -> &str {
                &self.metadata.spec_version
            }

            fn source(&self) -> &str {
                &self.metadata.source
            }

            fn subject(&self) -> &str {
                &self.metadata.subject
            }

            fn time(&self) -> chrono::DateTime<chrono::Utc> {
                self.metadata.time
            }

            fn execution_id(&self) -> &str {
                &self.metadata.execution_id
            }

            fn correlation_id(&self) -> &str {
                &self.metadata.correlation_id
            }

            fn causation_id(&self) -> Option<&str> {
                self.metadata.causation_id.as_deref()
            }

            fn principal_id(&self) -> &str {
                &self.metadata.principal_id
            }

            fn to_data_json(&self) -> String {
                serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::authorization::CallerIdentity;

    #[derive(Debug, Clone, Serialize)]
    struct ProbeEvent {
        metadata: EventMetadata,
        probe: String,
    }

    impl_domain_event!(ProbeEvent);

    #[test]
    fn test_metadata_from_context() {
        let ctx = ExecutionContext::with_correlation(CallerIdentity::new("admin-1", ["admin"]), "corr-1");
        let event = ProbeEvent {
            metadata: EventMetadata::from_context(&ctx, "role", "created", "0ABC"),
            probe: "value".to_string(),
        };

        assert_eq!(event.event_type(), "idm:role:created");
        assert_eq!(event.subject(), "idm.role.0ABC");
        assert_eq!(event.source(), "idm:platform");
        assert_eq!(event.spec_version(), "1.0");
        assert_eq!(event.correlation_id(), "corr-1");
        assert_eq!(event.execution_id(), ctx.execution_id);
        assert_eq!(event.principal_id(), "admin-1");
        assert!(event.causation_id().is_none());
        assert_eq!(event.event_id().len(), 13);
    }

    #[test]
    fn test_to_data_json() {
        let event = ProbeEvent {
            metadata: EventMetadata::from_context(&ExecutionContext::anonymous(), "user", "registered", "0XYZ"),
            probe: "payload".to_string(),
        };

        let json: serde_json::Value = serde_json::from_str(&event.to_data_json()).unwrap();
        assert_eq!(json["probe"], "payload");
        assert_eq!(json["metadata"]["eventType"], "idm:user:registered");
    }
}
