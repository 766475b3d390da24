//! Bump-pointer arena and typed allocation for bumpmap containers.
//!
//! Provides a bounded, resettable arena plus the typed layer that copies
//! keys and values into arena memory. Containers in `bumpmap-map` borrow an
//! [`Arena`] and never free individual entries; memory is reclaimed in bulk.
//!
//! # Architecture
//!
//! ```text
//! Arena (shared via &Arena, reset/release via &mut Arena)
//! └── BufferList (bounded by ArenaConfig::buffer_count)
//!     └── Buffer[] (buffer_size bytes, or larger for one big region; bump cursor)
//! TypedAllocator<T>  ── values, ArenaVec<T> slices, native escape hatch
//! ArenaClone         ── capability: deep copy into arena memory
//! ```
//!
//! # Lifetimes instead of caller contracts
//!
//! Everything handed out by the arena borrows it. Rewinding or freeing the
//! arena requires `&mut Arena`, so the compiler rejects any program that
//! would touch a region after [`Arena::reset`] or [`Arena::release`].
//!
//! # Unsafe code
//!
//! `unsafe` is confined to `buffer`, `arena`, `typed` and `clone`; every
//! block carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod buffer;
pub mod clone;
pub mod config;
pub mod error;
pub mod typed;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaStats};
pub use clone::{check_clone_policy, ArenaClone, ArenaStr, NativeHandle};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use typed::{ArenaVec, TypedAllocator};
