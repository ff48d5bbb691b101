//! # herd_core - Herd Core
//!
//! Primitives shared by every Herd crate:
//! - **Identities**: monotonic agent and target ids that are never reused
//! - **Errors**: the common error type for API misuse

pub mod error;
pub mod id;

pub use error::*;
pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HerdError, Result};
    pub use crate::id::{AgentId, IdGenerator, TargetId};
}
