//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for an [`Arena`](crate::Arena).
///
/// Controls buffer sizing and the hard limit on how many buffers the arena
/// may acquire. Validated at construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each arena buffer in bytes.
    ///
    /// Default: 1 MiB. A larger single allocation gets a buffer of its own
    /// size, which still counts against `buffer_count`.
    pub buffer_size: usize,

    /// Maximum number of buffers the arena may hold.
    ///
    /// Default: 16. There is no automatic growth past this limit;
    /// allocations fail with `OutOfBuffers` instead.
    pub buffer_count: usize,
}

impl ArenaConfig {
    /// Default buffer size: 1 MiB.
    pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

    /// Default maximum buffer count.
    pub const DEFAULT_BUFFER_COUNT: usize = 16;

    /// Create a config with the given buffer size and count.
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        Self {
            buffer_size,
            buffer_count,
        }
    }

    /// Check that both limits are non-zero.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.buffer_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "buffer_size must be greater than zero".into(),
            });
        }
        if self.buffer_count == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "buffer_count must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_SIZE, Self::DEFAULT_BUFFER_COUNT)
    }
}
