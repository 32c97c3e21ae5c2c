//! Shared building blocks

pub mod authorization;
pub mod error;
pub mod indexes;
pub mod memory_store;
pub mod tsid;

/// Fresh concurrency or security stamp.
pub(crate) fn fresh_stamp() -> String {
    uuid::Uuid::new_v4().simple().to_string().to_uppercase()
}
