//! Membership Aggregate
//!
//! The many-to-many relation between users and roles.

pub mod entity;
pub mod operations;
pub mod repository;
pub mod resolver;

pub use entity::Membership;
pub use operations::{AssignRoleCommand, AssignRoleUseCase, RoleAssigned};
pub use repository::{MembershipRepository, MongoMembershipRepository};
pub use resolver::MembershipResolver;
