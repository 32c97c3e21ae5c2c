//! User Aggregate

pub mod directory;
pub mod entity;
pub mod operations;
pub mod repository;

pub use directory::UserDirectory;
pub use entity::{User, UserSummary};
pub use operations::{RegisterUserCommand, RegisterUserUseCase, UserRegistered};
pub use repository::{MongoUserRepository, UserRepository};
