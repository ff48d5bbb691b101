//! Unique identifier generation
//!
//! Ids come from a monotonically increasing counter and are never derived from
//! the size of any collection, so removing one agent cannot shift another
//! agent's identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Create from a raw counter value
            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw counter value
            #[inline]
            pub const fn raw(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identity of a steering agent, stable for the agent's lifetime
    AgentId,
    "agent"
);

id_type!(
    /// Identity of a target that agents steer toward
    TargetId,
    "target"
);

/// Thread-safe monotonic id generator
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a new id generator starting at zero
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Generate the next unique id
    pub fn next<I: From<u64>>(&self) -> I {
        I::from(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("issued", &self.issued())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator() {
        let gen = IdGenerator::new();
        let id1: AgentId = gen.next();
        let id2: AgentId = gen.next();
        assert_ne!(id1, id2);
        assert_eq!(id1.raw(), 0);
        assert_eq!(id2.raw(), 1);
        assert_eq!(gen.issued(), 2);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(AgentId::from_raw(3).to_string(), "agent#3");
        assert_eq!(format!("{:?}", TargetId::from_raw(1)), "TargetId(1)");
    }
}
