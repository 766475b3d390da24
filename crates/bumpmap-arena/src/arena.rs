//! The bump-pointer [`Arena`] shared by every container.
//!
//! An `Arena` is lent to containers as `&Arena`; allocation goes through
//! interior mutability so any number of maps and sets can draw from one
//! arena at once. [`reset`](Arena::reset) and [`release`](Arena::release)
//! take `&mut self`, so the borrow checker guarantees that no container or
//! arena-backed handle is still alive when memory is rewound or freed.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr::NonNull;

use crate::buffer::BufferList;
use crate::clone::ArenaStr;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Alignment used by [`Arena::allocate`] for untyped byte regions.
pub const DEFAULT_ALIGN: usize = 8;

/// Allocation statistics for an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out since the last reset, alignment padding included.
    pub allocated_bytes: usize,
    /// Number of buffers currently held.
    pub buffer_count: usize,
    /// Bytes held from the host allocator.
    pub capacity_bytes: usize,
}

/// A bounded bump-pointer arena.
///
/// Memory comes from up to `buffer_count` buffers of `buffer_size` bytes.
/// A single request larger than `buffer_size` takes one buffer sized to
/// fit it, so a growing table is bounded by the buffer count, not by the
/// size of one buffer.
/// Individual regions are never freed; the whole arena is rewound with
/// [`reset`](Self::reset) (buffers kept for reuse) or emptied with
/// [`release`](Self::release) (buffers returned to the host allocator).
///
/// The arena is not `Sync`. Confine it, and every container built on it,
/// to one thread.
///
/// # Released arenas
///
/// A released arena holds no memory. Calling [`reset`](Self::reset) on it
/// rebuilds it with the original configuration and logs a warning. This
/// recovery is lossy: everything allocated before the release is gone. An
/// allocation from a released arena is a programming error and panics in
/// debug builds; release builds recover the same way as `reset`.
///
/// # Examples
///
/// ```
/// use bumpmap_arena::Arena;
///
/// let mut arena = Arena::new(4096, 2);
/// let region = arena.allocate(64).unwrap();
/// assert_eq!(region.as_ptr() as usize % 8, 0);
/// assert_eq!(arena.stats().allocated_bytes, 64);
///
/// arena.reset();
/// assert_eq!(arena.stats().allocated_bytes, 0);
/// ```
pub struct Arena {
    config: ArenaConfig,
    buffers: RefCell<BufferList>,
    released: Cell<bool>,
}

impl Arena {
    /// Create an arena of at most `buffer_count` buffers of `buffer_size` bytes.
    ///
    /// Zero values are raised to one. Use [`with_config`](Self::with_config)
    /// to have them rejected instead.
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        let config = ArenaConfig::new(buffer_size.max(1), buffer_count.max(1));
        Self::build(config)
    }

    /// Create an arena from a validated [`ArenaConfig`].
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ArenaConfig) -> Self {
        Self {
            config,
            buffers: RefCell::new(BufferList::new(config.buffer_size, config.buffer_count)),
            released: Cell::new(false),
        }
    }

    /// Allocate `size` bytes aligned to [`DEFAULT_ALIGN`].
    ///
    /// The region is uninitialised and stays valid until the arena is
    /// reset, released or dropped.
    pub fn allocate(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        let layout = Layout::from_size_align(size, DEFAULT_ALIGN).map_err(|_| {
            ArenaError::RegionTooLarge {
                requested: size,
                buffer_size: self.config.buffer_size,
            }
        })?;
        self.allocate_layout(layout)
    }

    /// Allocate an uninitialised region matching `layout`.
    pub fn allocate_layout(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        self.ensure_live();
        self.buffers.borrow_mut().alloc(layout)
    }

    /// Allocate a region matching `layout` with every byte set to zero.
    pub fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        let ptr = self.allocate_layout(layout)?;
        // SAFETY: the region was just handed out and spans `layout.size()` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Ok(ptr)
    }

    /// Copy `s` into the arena.
    pub fn alloc_str(&self, s: &str) -> Result<ArenaStr<'_>, ArenaError> {
        ArenaStr::copy_from(self, s)
    }

    /// Rewind every buffer. Memory is kept for reuse but not zeroed.
    ///
    /// On a released arena this rebuilds the arena from its original
    /// configuration (see the type-level docs).
    pub fn reset(&mut self) {
        if self.released.get() {
            self.recover();
            return;
        }
        self.buffers.get_mut().reset();
        tracing::trace!("arena reset");
    }

    /// Like [`reset`](Self::reset), but reports a released arena as
    /// `Err(ArenaError::InvalidArenaState)` instead of rebuilding it.
    pub fn try_reset(&mut self) -> Result<(), ArenaError> {
        if self.released.get() {
            return Err(ArenaError::InvalidArenaState);
        }
        self.reset();
        Ok(())
    }

    /// Return every buffer to the host allocator.
    pub fn release(&mut self) {
        let stats = self.stats();
        self.buffers.get_mut().release();
        self.released.set(true);
        tracing::debug!(
            buffers = stats.buffer_count,
            bytes = stats.capacity_bytes,
            "arena released"
        );
    }

    /// Rebuild a released arena with its original buffer size and count.
    ///
    /// Does nothing on a live arena.
    pub fn recover(&mut self) {
        self.rebuild();
    }

    fn ensure_live(&self) {
        self.ensure_live_with(cfg!(debug_assertions));
    }

    /// Panic on a released arena when `strict`, rebuild it otherwise.
    fn ensure_live_with(&self, strict: bool) {
        if self.released.get() {
            if strict {
                panic!("allocation from a released arena");
            }
            self.rebuild();
        }
    }

    fn rebuild(&self) {
        if !self.released.get() {
            return;
        }
        tracing::warn!(
            error = %ArenaError::InvalidArenaState,
            buffer_size = self.config.buffer_size,
            buffer_count = self.config.buffer_count,
            "rebuilding released arena; earlier allocations are discarded"
        );
        // Nothing can point into a released arena, so replacing the list
        // through a shared reference is sound.
        *self.buffers.borrow_mut() =
            BufferList::new(self.config.buffer_size, self.config.buffer_count);
        self.released.set(false);
    }

    /// Whether [`release`](Self::release) has been called without a rebuild since.
    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Current allocation statistics.
    pub fn stats(&self) -> ArenaStats {
        let buffers = self.buffers.borrow();
        ArenaStats {
            allocated_bytes: buffers.total_used(),
            buffer_count: buffers.buffer_count(),
            capacity_bytes: buffers.memory_bytes(),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::build(ArenaConfig::default())
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .field("released", &self.released.get())
            .finish()
    }
}
