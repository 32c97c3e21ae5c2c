//! Use Case Infrastructure
//!
//! - `UseCaseResult<T>` - sealed outcome of a mutating operation
//! - `UseCaseError` - the error taxonomy
//! - `DomainEvent` - facts emitted by successful mutations
//! - `ExecutionContext` - tracing ids and the verified caller
//! - `UnitOfWork` - atomic commit of aggregate + event + audit log

pub mod domain_event;
pub mod error;
pub mod execution_context;
pub mod result;
pub mod unit_of_work;

pub use domain_event::{DomainEvent, EventMetadata};
pub use error::{UseCaseError, INTERNAL_ERROR_MESSAGE};
pub use execution_context::ExecutionContext;
pub use result::UseCaseResult;
pub use unit_of_work::{Aggregate, Cascade, MongoUnitOfWork, Reference, UniqueKey, UnitOfWork};
