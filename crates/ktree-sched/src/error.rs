//! Error types for dispatch operations.
//!
//! Only genuine programmer/configuration faults live here. Resource
//! contention and unrecognised trigger selectors are expected steady-state
//! outcomes and travel through `DispatchOutcome`, never through this enum.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that abort a dispatch cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// A pool coordinate lies outside the declared fabric shape.
    #[error("{pool} index {index} out of range (limit {limit})")]
    OutOfRange {
        /// Pool axis that was violated.
        pool: &'static str,
        /// Requested index.
        index: usize,
        /// Exclusive upper bound for this axis.
        limit: usize,
    },

    /// A tree/stage/branch tuple does not address a kernel branch.
    #[error("invalid task address: tree {tree}, stage {stage}, branch {branch}")]
    InvalidTaskAddress {
        /// Requested tree index.
        tree: usize,
        /// Requested stage index.
        stage: usize,
        /// Requested branch index.
        branch: usize,
    },

    /// A transfer would read outside the source buffer.
    #[error("buffer overrun: {len} bytes at offset {offset} exceed {capacity}-byte buffer")]
    BufferOverrun {
        /// Byte offset of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Size of the buffer that was addressed.
        capacity: usize,
    },
}

impl SchedulerError {
    /// Create an out-of-range error for one pool axis.
    pub const fn out_of_range(pool: &'static str, index: usize, limit: usize) -> Self {
        Self::OutOfRange { pool, index, limit }
    }

    /// Create an invalid task address error.
    pub const fn invalid_task_address(tree: usize, stage: usize, branch: usize) -> Self {
        Self::InvalidTaskAddress { tree, stage, branch }
    }

    /// Create a buffer overrun error.
    pub const fn buffer_overrun(offset: usize, len: usize, capacity: usize) -> Self {
        Self::BufferOverrun { offset, len, capacity }
    }
}
