//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena and container operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Every buffer is full and the buffer count limit has been reached.
    OutOfBuffers {
        /// Number of bytes requested.
        requested: usize,
        /// Configured maximum number of buffers.
        buffer_count: usize,
    },
    /// A single request is too large to describe as a host allocation.
    RegionTooLarge {
        /// Number of bytes requested (including alignment padding).
        requested: usize,
        /// Size of each arena buffer in bytes.
        buffer_size: usize,
    },
    /// A key or value type cannot be cloned into arena memory.
    ClonePolicyViolation {
        /// The rejected type.
        type_name: &'static str,
    },
    /// The arena's buffers were released while it was still in use.
    ///
    /// [`Arena::reset`](crate::Arena::reset) recovers from this by
    /// rebuilding the arena, discarding every earlier allocation.
    InvalidArenaState,
    /// Arena configuration or container options were rejected.
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBuffers {
                requested,
                buffer_count,
            } => {
                write!(
                    f,
                    "arena out of buffers: requested {requested} bytes with all {buffer_count} buffers in use"
                )
            }
            Self::RegionTooLarge {
                requested,
                buffer_size,
            } => {
                write!(
                    f,
                    "region too large: requested {requested} bytes, buffer size {buffer_size} bytes"
                )
            }
            Self::ClonePolicyViolation { type_name } => {
                write!(f, "type {type_name} cannot be cloned into arena memory")
            }
            Self::InvalidArenaState => {
                write!(f, "arena used after its buffers were released")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}
