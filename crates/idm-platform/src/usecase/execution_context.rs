//! Execution Context
//!
//! Tracing ids and the verified caller for one use case execution.

use chrono::{DateTime, Utc};

use crate::shared::authorization::CallerIdentity;
use crate::shared::tsid::TsidGenerator;

/// Context for a use case execution.
///
/// - `execution_id` identifies this call
/// - `correlation_id` ties it to the upstream request
/// - `causation_id` names the event that triggered it, if any
/// - `caller` is the authenticated principal and its role claims
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub correlation_id: String,
    pub causation_id: Option<String>,
    pub caller: CallerIdentity,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Fresh context for a request. The correlation id starts as the execution id.
    pub fn create(caller: CallerIdentity) -> Self {
        let exec_id = format!("exec-{}", TsidGenerator::generate());
        Self {
            execution_id: exec_id.clone(),
            correlation_id: exec_id,
            causation_id: None,
            caller,
            initiated_at: Utc::now(),
        }
    }

    /// Context carrying an upstream correlation id.
    pub fn with_correlation(caller: CallerIdentity, correlation_id: impl Into<String>) -> Self {
        Self {
            execution_id: format!("exec-{}", TsidGenerator::generate()),
            correlation_id: correlation_id.into(),
            causation_id: None,
            caller,
            initiated_at: Utc::now(),
        }
    }

    /// Caller without any role claims.
    pub fn anonymous() -> Self {
        Self::create(CallerIdentity::anonymous())
    }

    /// Internal caller holding the `admin` claim, used by bootstrap tooling.
    pub fn system() -> Self {
        Self::create(CallerIdentity::system())
    }

    /// Child context within the same execution.
    pub fn with_causation(&self, causing_event_id: impl Into<String>) -> Self {
        Self {
            execution_id: self.execution_id.clone(),
            correlation_id: self.correlation_id.clone(),
            causation_id: Some(causing_event_id.into()),
            caller: self.caller.clone(),
            initiated_at: Utc::now(),
        }
    }

    pub fn principal_id(&self) -> &str {
        &self.caller.principal_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context() {
        let ctx = ExecutionContext::create(CallerIdentity::new("user-123", ["admin"]));

        assert!(ctx.execution_id.starts_with("exec-"));
        assert_eq!(ctx.principal_id(), "user-123");
        assert_eq!(ctx.correlation_id, ctx.execution_id);
        assert!(ctx.causation_id.is_none());
    }

    #[test]
    fn test_with_correlation() {
        let ctx = ExecutionContext::with_correlation(CallerIdentity::anonymous(), "corr-456");

        assert_eq!(ctx.correlation_id, "corr-456");
        assert_ne!(ctx.execution_id, "corr-456");
    }

    #[test]
    fn test_with_causation_keeps_caller() {
        let ctx = ExecutionContext::system();
        let child = ctx.with_causation("evt-789");

        assert_eq!(child.execution_id, ctx.execution_id);
        assert_eq!(child.causation_id.as_deref(), Some("evt-789"));
        assert!(child.caller.is_admin());
    }

    #[test]
    fn test_anonymous_has_no_claims() {
        let ctx = ExecutionContext::anonymous();
        assert!(ctx.caller.roles.is_empty());
        assert!(!ctx.caller.is_admin());
    }
}
