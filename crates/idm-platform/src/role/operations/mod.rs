//! Role Operations

pub mod create;
pub mod delete;
pub mod events;

pub use create::{CreateRoleCommand, CreateRoleUseCase};
pub use delete::{DeleteRoleCommand, DeleteRoleUseCase};
pub use events::*;
