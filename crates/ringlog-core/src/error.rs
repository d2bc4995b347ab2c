//! Error types for ringlog-core
//!
//! Initialization failures are reported by the multiring as [`RingError`];
//! the object log wraps them into [`LogError`] next to its own recoverable
//! failures.

use thiserror::Error;

/// Errors raised while setting up a multiring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// The region list was empty (or started with the zero-length sentinel)
    #[error("No usable regions supplied")]
    NoRegions,

    /// No region can hold a fragment header plus one payload byte
    #[error("Largest region holds {largest} bytes, at least {required} are required")]
    RegionTooSmall { largest: usize, required: usize },
}

/// Errors that can occur in object log operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// The underlying multiring could not be initialized
    #[error("Initialization failed: {0}")]
    Init(#[from] RingError),

    /// The object does not fit even after evicting every live record
    #[error("Object needs {required} bytes but the log holds {capacity} ({deficit} missing)")]
    InsufficientCapacity {
        required: usize,
        capacity: usize,
        deficit: usize,
    },

    /// No live record at the requested index
    #[error("Index {index} out of range for {entries} entries")]
    IndexOutOfRange { index: isize, entries: usize },
}

impl LogError {
    /// Create a new InsufficientCapacity error
    pub fn insufficient_capacity(required: usize, capacity: usize) -> Self {
        Self::InsufficientCapacity {
            required,
            capacity,
            deficit: required.saturating_sub(capacity),
        }
    }

    /// Create a new IndexOutOfRange error
    pub fn index_out_of_range(index: isize, entries: usize) -> Self {
        Self::IndexOutOfRange { index, entries }
    }

    /// Number of bytes the log is short of, for capacity failures
    pub fn deficit(&self) -> Option<usize> {
        match self {
            Self::InsufficientCapacity { deficit, .. } => Some(*deficit),
            _ => None,
        }
    }
}
