//! Membership Operations

pub mod assign;
pub mod events;

pub use assign::{AssignRoleCommand, AssignRoleUseCase};
pub use events::*;
