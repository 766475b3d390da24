//! Singly linked association list with arena-allocated nodes.
//!
//! Suited to small key sets where hashing costs more than a short walk.
//! Unlinked nodes go to a free pool on the native heap and are reused by
//! later pushes, so a list with steady churn stops drawing on the arena.

use std::borrow::Borrow;
use std::cell::Cell;
use std::fmt;

use bumpmap_arena::{check_clone_policy, Arena, ArenaClone, ArenaError, TypedAllocator};
use smallvec::SmallVec;

type Link<'a, K, V> = Option<&'a Cell<Node<'a, K, V>>>;

#[derive(Clone, Copy)]
struct Node<'a, K, V> {
    next: Link<'a, K, V>,
    key: K,
    value: V,
}

/// An association list whose nodes live in an [`Arena`].
///
/// Pushing a key that is already present updates it in place; otherwise
/// the new entry becomes the head. [`scan`](Self::scan) therefore visits
/// the most recently added key first.
///
/// # Examples
///
/// ```
/// use bumpmap_arena::Arena;
/// use bumpmap_map::LinkedList;
///
/// let arena = Arena::new(4096, 1);
/// let mut list = LinkedList::<char, u32>::new(&arena)?;
/// list.push('a', 1u32)?;
/// list.push('b', 2u32)?;
/// assert_eq!(list.push('a', 3u32)?, Some(1));
/// assert_eq!(list.get(&'a'), Some(3));
/// assert_eq!(list.delete(&'b'), Some(2));
/// assert_eq!(list.len(), 1);
/// # Ok::<(), bumpmap_arena::ArenaError>(())
/// ```
pub struct LinkedList<'a, K, V> {
    nodes: TypedAllocator<'a, Node<'a, K, V>>,
    head: Link<'a, K, V>,
    len: usize,
    free: SmallVec<[&'a Cell<Node<'a, K, V>>; 16]>,
}

impl<'a, K, V> LinkedList<'a, K, V>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Eq + Default,
    V: ArenaClone<'a, Cloned = V> + Copy + Default,
{
    /// Create an empty list.
    ///
    /// # Errors
    ///
    /// `ClonePolicyViolation` if `K` or `V` cannot be cloned into the arena.
    pub fn new(arena: &'a Arena) -> Result<Self, ArenaError> {
        check_clone_policy::<K>(arena)?;
        check_clone_policy::<V>(arena)?;
        Ok(Self {
            nodes: TypedAllocator::new(arena),
            head: None,
            len: 0,
            free: SmallVec::new(),
        })
    }
}

impl<'a, K, V> LinkedList<'a, K, V>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Eq,
    V: ArenaClone<'a, Cloned = V> + Copy,
{
    fn nodes(&self) -> Nodes<'a, K, V> {
        Nodes { next: self.head }
    }

    /// Insert `key` at the head, or update its value if present.
    ///
    /// Returns the previous value when `key` was already present.
    ///
    /// # Errors
    ///
    /// Allocation errors from cloning or from allocating a node.
    pub fn push<Q, W>(&mut self, key: Q, value: W) -> Result<Option<V>, ArenaError>
    where
        Q: ArenaClone<'a, Cloned = K>,
        K: PartialEq<Q>,
        W: ArenaClone<'a, Cloned = V>,
    {
        let arena = self.nodes.arena();
        if let Some(cell) = self.nodes().find(|cell| cell.get().key == key) {
            let mut node = cell.get();
            let old = node.value;
            node.value = value.clone_in(arena)?;
            cell.set(node);
            return Ok(Some(old));
        }

        let node = Node {
            next: self.head,
            key: key.clone_in(arena)?,
            value: value.clone_in(arena)?,
        };
        let cell = match self.free.pop() {
            Some(cell) => {
                cell.set(node);
                cell
            }
            None => Cell::from_mut(self.nodes.alloc_value(node)?),
        };
        self.head = Some(cell);
        self.len += 1;
        Ok(None)
    }

    /// Copy of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.nodes()
            .map(Cell::get)
            .find(|node| key == node.key.borrow())
            .map(|node| node.value)
    }

    /// Unlink `key` and return its value. The node is kept for reuse.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut prev: Link<'a, K, V> = None;
        let mut curr = self.head;
        while let Some(cell) = curr {
            let node = cell.get();
            if key == node.key.borrow() {
                match prev {
                    Some(prev) => {
                        let mut linked = prev.get();
                        linked.next = node.next;
                        prev.set(linked);
                    }
                    None => self.head = node.next,
                }
                self.free.push(cell);
                self.len -= 1;
                return Some(node.value);
            }
            prev = curr;
            curr = node.next;
        }
        None
    }

    /// Unlink every entry, keeping all nodes for reuse.
    pub fn delete_all(&mut self) {
        let mut curr = self.head.take();
        while let Some(cell) = curr {
            curr = cell.get().next;
            self.free.push(cell);
        }
        self.len = 0;
    }

    /// Visit entries from the head until `visitor` returns `false`.
    pub fn scan<F>(&self, mut visitor: F)
    where
        F: FnMut(K, V) -> bool,
    {
        for cell in self.nodes() {
            let node = cell.get();
            if !visitor(node.key, node.value) {
                break;
            }
        }
    }

    /// Drop every entry and the free pool.
    ///
    /// Unlike [`delete_all`](Self::delete_all) the nodes are abandoned to
    /// the arena and reclaimed only when it is reset.
    pub fn clear(&mut self) {
        self.head = None;
        self.len = 0;
        self.free.clear();
    }
}

impl<'a, K, V> LinkedList<'a, K, V> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of unlinked nodes waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Drop the list, ending its borrow of the arena.
    pub fn release(self) {
        tracing::trace!(len = self.len, pooled = self.free.len(), "list released");
    }
}

impl<'a, K, V> fmt::Debug for LinkedList<'a, K, V>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Eq + fmt::Debug,
    V: ArenaClone<'a, Cloned = V> + Copy + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.nodes().map(|cell| {
                let node = cell.get();
                (node.key, node.value)
            }))
            .finish()
    }
}

struct Nodes<'a, K, V> {
    next: Link<'a, K, V>,
}

impl<'a, K: Copy, V: Copy> Iterator for Nodes<'a, K, V> {
    type Item = &'a Cell<Node<'a, K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.next?;
        self.next = cell.get().next;
        Some(cell)
    }
}
