//! IDM Common
//!
//! Runtime plumbing shared by every IDM binary.

pub mod logging;

pub use logging::{init_logging, LogFormat};
