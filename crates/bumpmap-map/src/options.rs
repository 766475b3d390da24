//! Construction options for maps and sets.

use bumpmap_arena::ArenaError;

/// Options for [`Map`](crate::Map) and [`Set`](crate::Set).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapOptions {
    /// Initial number of slots. Rounded up to a power of two.
    ///
    /// Default: 64.
    pub capacity: usize,

    /// Maximum ratio of live entries to slots before the table doubles.
    ///
    /// Default: 0.85. Must be in `(0, 1]`.
    pub load_factor: f64,
}

impl MapOptions {
    /// Default initial slot count.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Default load factor.
    pub const DEFAULT_LOAD_FACTOR: f64 = 0.85;

    /// Options with the default capacity and load factor.
    pub fn new() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            load_factor: Self::DEFAULT_LOAD_FACTOR,
        }
    }

    /// Set the initial slot count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the load factor.
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if:
    /// - `capacity` is zero or has no power of two above it
    /// - `load_factor` is NaN, not positive, or greater than 1
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be greater than zero".into(),
            });
        }
        if self.capacity.checked_next_power_of_two().is_none() {
            return Err(ArenaError::InvalidConfig {
                reason: format!("capacity {} cannot be rounded to a power of two", self.capacity),
            });
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ArenaError::InvalidConfig {
                reason: format!("load_factor must be in (0, 1], got {}", self.load_factor),
            });
        }
        Ok(())
    }

    /// Slot count of the first table: `capacity` rounded up to a power of two.
    pub fn table_capacity(&self) -> usize {
        self.capacity
            .checked_next_power_of_two()
            .unwrap_or(1 << (usize::BITS - 1))
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::new()
    }
}
