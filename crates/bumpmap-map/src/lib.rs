//! Arena-backed associative containers.
//!
//! [`Map`] is an open-addressing hash map with linear probing and
//! backward-shift deletion whose slot table is untyped arena memory. [`Set`]
//! wraps `Map<K, ()>`. [`LinkedList`] is an association list for small key
//! sets. All three borrow a [`bumpmap_arena::Arena`], deep-copy keys and
//! values into it on every write, and never free individual entries.
//!
//! ```text
//! Map<'a, K, V, S>
//! ├── SlotTable<K, V>   power-of-two slots: [tag | K | V] at fixed stride
//! ├── S: BuildHasher     ahash::RandomState by default
//! └── &'a Arena          tables, cloned keys and values
//! ```
//!
//! Containers hold `&Arena`, so they are neither `Send` nor `Sync`, and the
//! arena cannot be reset or released while any of them is alive.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod list;
pub mod map;
pub mod options;
pub mod set;
mod slot;

pub use list::LinkedList;
pub use map::Map;
pub use options::MapOptions;
pub use set::Set;
