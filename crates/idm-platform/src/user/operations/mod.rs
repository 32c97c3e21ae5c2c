//! User Operations

pub mod events;
pub mod register;

pub use events::*;
pub use register::{RegisterUserCommand, RegisterUserUseCase};
