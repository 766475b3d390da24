//! bumpmap: hash maps and sets whose storage comes from a bump-pointer arena.
//!
//! Built for large, disposable collections (batch dedup, graph traversal
//! scratch state) that are filled, queried and then thrown away together.
//! Entries are never freed one by one; the arena is reset or released in
//! bulk. This is the facade crate re-exporting the public API of the
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use bumpmap::prelude::*;
//!
//! let mut arena = Arena::new(1 << 20, 4);
//! for batch in [["a", "b", "a"], ["c", "c", "c"]] {
//!     let mut seen = Set::<ArenaStr<'_>>::new(&arena, MapOptions::default())?;
//!     let mut counts = Map::<ArenaStr<'_>, u32>::new(&arena, MapOptions::default())?;
//!     for word in batch {
//!         seen.add(ArenaStr::new(word))?;
//!         let n = counts.get(word).unwrap_or(0);
//!         counts.set(ArenaStr::new(word), n + 1)?;
//!     }
//!     assert!(seen.len() <= 2);
//!     seen.release();
//!     counts.release();
//!     arena.reset();
//! }
//! # Ok::<(), ArenaError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `bumpmap-arena` | `Arena`, `TypedAllocator`, `ArenaClone`, errors |
//! | [`map`] | `bumpmap-map` | `Map`, `Set`, `LinkedList`, `MapOptions` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Arena, typed allocation and the clone capability (`bumpmap-arena`).
pub use bumpmap_arena as arena;

/// Arena-backed containers (`bumpmap-map`).
///
/// [`map::Map`] for key/value lookups, [`map::Set`] for membership and
/// dedup, [`map::LinkedList`] for very small key sets.
pub use bumpmap_map as map;

/// Common imports for typical bumpmap usage.
///
/// ```rust
/// use bumpmap::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use bumpmap_arena::{Arena, ArenaClone, ArenaConfig, ArenaError, ArenaStr};

    // Containers
    pub use bumpmap_map::{LinkedList, Map, MapOptions, Set};
}
