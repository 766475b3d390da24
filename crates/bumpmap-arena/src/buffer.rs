//! Fixed-size memory buffers and bounded buffer lists.
//!
//! A [`Buffer`] is one contiguous block from the host allocator with a bump
//! cursor. A [`BufferList`] is a bounded collection of buffers that overflows
//! into the next buffer when the current one is full.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::ArenaError;

/// Alignment of every buffer's base address.
///
/// Requests with a larger alignment are still served; they pay for the
/// padding out of the buffer.
pub const BUFFER_ALIGN: usize = 16;

/// A single contiguous block of host memory with bump allocation.
///
/// Buffers never move and are never freed during their lifetime, only
/// rewound by [`reset`](Buffer::reset). Memory handed out is uninitialised
/// unless the caller zeroes it.
pub struct Buffer {
    /// Start of the block.
    data: NonNull<u8>,
    /// Layout the block was allocated with.
    layout: Layout,
    /// Bump cursor: byte offset of the next free position.
    cursor: usize,
}

impl Buffer {
    /// Acquire a buffer of `size` bytes from the host allocator.
    ///
    /// Returns `None` for a zero or unrepresentable size.
    ///
    /// # Panics
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] when the host
    /// allocator is out of memory.
    pub fn new(size: usize) -> Option<Self> {
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, BUFFER_ALIGN).ok()?;
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let data = match NonNull::new(raw) {
            Some(data) => data,
            None => alloc::handle_alloc_error(layout),
        };
        Some(Self {
            data,
            layout,
            cursor: 0,
        })
    }

    /// Bump-allocate a region matching `layout`.
    ///
    /// Returns `None` if the remaining space cannot hold the region after
    /// alignment padding.
    pub fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let base = self.data.as_ptr() as usize;
        let unaligned = base.checked_add(self.cursor)?;
        let aligned = unaligned.checked_add(layout.align() - 1)? & !(layout.align() - 1);
        let start = aligned - base;
        let end = start.checked_add(layout.size())?;
        if end > self.layout.size() {
            return None;
        }
        self.cursor = end;
        // SAFETY: `start <= end <= size`, so the offset stays inside (or one
        // past the end of) the block.
        Some(unsafe { NonNull::new_unchecked(self.data.as_ptr().add(start)) })
    }

    /// Rewind the bump cursor to zero without freeing or zeroing memory.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of bytes handed out since the last reset, padding included.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total size of the block in bytes.
    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Remaining free bytes.
    pub fn remaining(&self) -> usize {
        self.layout.size() - self.cursor
    }
}

// SAFETY: a `Buffer` exclusively owns its block; moving it to another
// thread moves that ownership with it.
unsafe impl Send for Buffer {}

impl Drop for Buffer {
    fn drop(&mut self) {
        // SAFETY: `data` was allocated in `new` with exactly this layout.
        unsafe { alloc::dealloc(self.data.as_ptr(), self.layout) }
    }
}

/// A bounded list of [`Buffer`]s with overflow-based bump allocation.
///
/// When the current buffer is full, the next one is used: an existing
/// buffer left over from before a reset, or a freshly acquired one while
/// fewer than `buffer_count` exist. Regions never straddle two buffers; a
/// region larger than `buffer_size` gets a buffer of its own size.
pub struct BufferList {
    buffers: Vec<Buffer>,
    buffer_size: usize,
    buffer_count: usize,
    /// Index of the buffer currently being filled.
    current: usize,
}

impl BufferList {
    /// Create a buffer list holding one freshly acquired buffer.
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        let mut list = Self {
            buffers: Vec::with_capacity(buffer_count.min(64)),
            buffer_size,
            buffer_count,
            current: 0,
        };
        list.acquire(buffer_size);
        list
    }

    /// Bump-allocate a region, advancing to the next buffer if needed.
    ///
    /// A region larger than `buffer_size` is served from a dedicated buffer
    /// sized to fit it, which counts against `buffer_count` like any other.
    ///
    /// Returns `Err(ArenaError::OutOfBuffers)` once every permitted buffer
    /// is full, or `Err(ArenaError::RegionTooLarge)` if the region cannot
    /// be described as a host allocation at all.
    pub fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        if let Some(buffer) = self.buffers.get_mut(self.current) {
            if let Some(ptr) = buffer.alloc(layout) {
                return Ok(ptr);
            }
        }

        // Current buffer full: move into buffers kept from before a reset.
        while self.current + 1 < self.buffers.len() {
            self.current += 1;
            if let Some(ptr) = self.buffers[self.current].alloc(layout) {
                return Ok(ptr);
            }
        }

        if self.buffers.len() >= self.buffer_count {
            return Err(ArenaError::OutOfBuffers {
                requested: layout.size(),
                buffer_count: self.buffer_count,
            });
        }

        // Worst-case footprint in a fresh buffer.
        let padding = layout.align().saturating_sub(BUFFER_ALIGN);
        let footprint = layout.size().saturating_add(padding);
        let too_large = ArenaError::RegionTooLarge {
            requested: footprint,
            buffer_size: self.buffer_size,
        };
        if !self.acquire(footprint.max(self.buffer_size)) {
            return Err(too_large);
        }
        self.buffers
            .get_mut(self.current)
            .and_then(|buffer| buffer.alloc(layout))
            .ok_or(too_large)
    }

    /// Push a new buffer of `size` bytes and make it current.
    ///
    /// Returns `false` when no buffer of that size can be described.
    fn acquire(&mut self, size: usize) -> bool {
        let Some(buffer) = Buffer::new(size) else {
            return false;
        };
        self.buffers.push(buffer);
        self.current = self.buffers.len() - 1;
        tracing::debug!(
            size,
            dedicated = size > self.buffer_size,
            buffers = self.buffers.len(),
            limit = self.buffer_count,
            "arena buffer acquired"
        );
        true
    }

    /// Rewind every buffer. Allocation restarts at buffer 0.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.reset();
        }
        self.current = 0;
    }

    /// Return every buffer to the host allocator.
    pub fn release(&mut self) {
        self.buffers.clear();
        self.buffers.shrink_to_fit();
        self.current = 0;
    }

    /// Whether the list holds no buffers (after [`release`](Self::release)).
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Number of buffers currently held.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes handed out across all buffers, padding included.
    pub fn total_used(&self) -> usize {
        self.buffers.iter().map(Buffer::used).sum()
    }

    /// Bytes held from the host allocator across all buffers.
    pub fn memory_bytes(&self) -> usize {
        self.buffers.iter().map(Buffer::capacity).sum()
    }
}
