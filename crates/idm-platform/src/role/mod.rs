//! Role Aggregate

pub mod entity;
pub mod operations;
pub mod registry;
pub mod repository;

pub use entity::{Role, RoleDetail, RoleSummary};
pub use operations::{
    CreateRoleCommand, CreateRoleUseCase, DeleteRoleCommand, DeleteRoleUseCase, RoleCreated,
    RoleDeleted,
};
pub use registry::RoleRegistry;
pub use repository::{MongoRoleRepository, RoleRepository};
