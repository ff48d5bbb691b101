//! Error types for the core library

use crate::id::{AgentId, TargetId};
use thiserror::Error;

/// Errors raised when the simulation API is misused.
///
/// Numeric degeneracies (zero-length vectors, empty neighborhoods, missing
/// paths) are never errors; they resolve to a zero steering contribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HerdError {
    /// Agent is not (or no longer) registered
    #[error("Agent not found: {0}")]
    UnknownAgent(AgentId),

    /// Target was never created
    #[error("Target not found: {0}")]
    UnknownTarget(TargetId),

    /// A tunable is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, HerdError>;
