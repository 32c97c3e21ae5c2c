//! Authorization Gate
//!
//! Admits role mutations only for callers whose verified claims contain the
//! literal `admin` role. Claims are trusted as supplied by the authentication
//! layer; nothing here re-reads the store.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::usecase::UseCaseError;

/// Role claim required by gated operations. Matched exactly, case-sensitive.
pub const ADMIN_ROLE: &str = "admin";

const ANONYMOUS_PRINCIPAL: &str = "anonymous";
const SYSTEM_PRINCIPAL: &str = "system";

/// Authenticated caller as handed over by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub principal_id: String,
    pub roles: HashSet<String>,
}

impl CallerIdentity {
    pub fn new<I, S>(principal_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal_id: principal_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Unauthenticated caller with no claims.
    pub fn anonymous() -> Self {
        Self {
            principal_id: ANONYMOUS_PRINCIPAL.to_string(),
            roles: HashSet::new(),
        }
    }

    /// Internal principal holding the admin claim.
    pub fn system() -> Self {
        Self::new(SYSTEM_PRINCIPAL, [ADMIN_ROLE])
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Per-request gate state. Starts `Unchecked`, ends `Authorized` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Unchecked,
    Authorized,
    Rejected,
}

impl GateState {
    pub fn is_authorized(self) -> bool {
        self == GateState::Authorized
    }
}

/// Guard called first by every gated operation. Holds no per-request state.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate {
    required_role: &'static str,
}

impl AuthorizationGate {
    /// Gate requiring the `admin` claim.
    pub fn admin() -> Self {
        Self {
            required_role: ADMIN_ROLE,
        }
    }

    /// Move a request from `Unchecked` to its terminal state.
    pub fn check(&self, caller: &CallerIdentity) -> GateState {
        if caller.has_role(self.required_role) {
            GateState::Authorized
        } else {
            GateState::Rejected
        }
    }

    /// Run the check and turn a rejection into `ForbiddenError`.
    pub fn require(&self, caller: &CallerIdentity, operation: &str) -> Result<(), UseCaseError> {
        match self.check(caller) {
            GateState::Authorized => {
                debug!(principal_id = %caller.principal_id, operation, "Authorization granted");
                Ok(())
            }
            GateState::Rejected | GateState::Unchecked => {
                warn!(
                    principal_id = %caller.principal_id,
                    operation,
                    required_role = self.required_role,
                    "Authorization rejected"
                );
                Err(UseCaseError::forbidden(
                    "FORBIDDEN",
                    format!("'{}' requires the '{}' role", operation, self.required_role),
                ))
            }
        }
    }
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::admin()
    }
}
