//! IDM Platform
//!
//! Users, named roles and the membership between them:
//! - Role Registry: list, detail, create, delete, assign
//! - User Directory: list, register
//! - Membership Resolver: members-of, is-member
//! - Authorization Gate: role mutations need the `admin` claim
//! - Identity store contract with MongoDB and in-memory implementations
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `operations` - Use case operations

pub mod membership;
pub mod role;
pub mod user;

pub mod audit;
pub mod auth;

pub mod shared;
pub mod usecase;

pub mod platform;

pub use shared::authorization::{AuthorizationGate, CallerIdentity, GateState, ADMIN_ROLE};
pub use shared::error::{Result, StoreError};
pub use shared::indexes::initialize_indexes;
pub use shared::memory_store::InMemoryIdentityStore;
pub use shared::tsid::TsidGenerator;

pub use usecase::{
    DomainEvent, ExecutionContext, MongoUnitOfWork, UnitOfWork, UseCaseError, UseCaseResult,
};

pub use audit::{AuditLog, AuditLogRepository, MongoAuditLogRepository};
pub use auth::{Argon2Config, CredentialError, CredentialHasher, PasswordPolicy, PasswordService};
pub use membership::{Membership, MembershipRepository, MembershipResolver, RoleAssigned};
pub use platform::IdentityPlatform;
pub use role::{Role, RoleCreated, RoleDeleted, RoleDetail, RoleRegistry, RoleRepository, RoleSummary};
pub use user::{User, UserDirectory, UserRegistered, UserRepository, UserSummary};
