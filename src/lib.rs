//! Red-Black Tree based ordered containers with stable node addresses.
//!
//! [`Redwood`] maps keys to values under a compile-time [`Comparator`]. Nodes
//! never move once linked, and a [`Cursor`]/[`CursorMut`] found by a single
//! descent can insert, remove or replace at that spot without searching again.
//!
//! The tree works in two modes, sharing the same balancing code:
//!
//! - **owning**: nodes are allocated and freed through a [`NodeAllocator`]
//!   ([`HeapAllocator`] by default).
//! - **intrusive**: [`IntrusiveRedwood`] links nodes embedded in storage owned
//!   by the caller and never allocates.
//!
//! ```
//! use redwood::Redwood;
//!
//! let mut tree = Redwood::new();
//! tree.upsert(3, "three");
//! tree.upsert(1, "one");
//! tree.upsert(2, "two");
//!
//! assert_eq!(tree.find(&2), Some(&"two"));
//! assert_eq!(tree.closest_leq(&10).map(|node| *node.key()), Some(3));
//! assert!(tree.iter().map(|(k, _)| *k).eq([1, 2, 3]));
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod allocator;
mod compare;
mod cursor;
mod iter;
mod node;
mod rebalance;
#[cfg(any(test, feature = "verify"))]
mod verify;

use core::alloc::Layout;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use alloc::boxed::Box;
use alloc::vec::Vec;

pub use allocator::{HeapAllocator, NodeAllocator, NoopAllocator};
pub use compare::{Comparator, NaturalOrder};
pub use cursor::{Cursor, CursorMut};
pub use iter::{RedwoodSortedIterator, RedwoodSortedIteratorMut};
pub use node::{NodeColor, RedwoodNode};

use node::{Link, NodePtr};

/// An ordered map backed by a red-black tree.
///
/// Lookups, insertions and removals take `O(log n)`. The smallest node is
/// cached, so [`first`](Self::first) and in-order traversal start in constant
/// time.
pub struct Redwood<K, V, C: Comparator<K> = NaturalOrder, A: NodeAllocator = HeapAllocator> {
    allocator: A,
    num_nodes: usize,
    root: Link<K, V>,
    first: Link<K, V>,
    _marker: PhantomData<(Box<RedwoodNode<K, V>>, fn() -> C)>,
}

/// A tree over caller-owned nodes. It only ever touches the links of the nodes
/// it is given, see [`CursorMut::insert_node`] and [`CursorMut::remove_node`].
pub type IntrusiveRedwood<K, C = NaturalOrder> = Redwood<K, (), C, NoopAllocator>;

impl<K: Ord, V> Redwood<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_allocator(HeapAllocator)
    }
}

impl<K, V, C: Comparator<K>, A: NodeAllocator> Redwood<K, V, C, A> {
    #[must_use]
    pub const fn with_allocator(allocator: A) -> Self {
        Self {
            allocator,
            num_nodes: 0,
            root: None,
            first: None,
            _marker: PhantomData,
        }
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Node with the smallest key.
    pub fn first(&self) -> Option<&RedwoodNode<K, V>> {
        self.first.map(|node| unsafe { node.as_ref() })
    }

    pub(crate) fn allocate_node(&mut self, key: K, value: V) -> NodePtr<K, V> {
        let layout = Layout::new::<RedwoodNode<K, V>>();
        let ptr = self.allocator.allocate(layout).cast::<RedwoodNode<K, V>>();

        unsafe { ptr.as_ptr().write(RedwoodNode::new(key, value)) };
        NodePtr::new(ptr)
    }

    /// Moves the node out of its storage and gives the storage back to the
    /// allocator.
    pub(crate) unsafe fn free_node(&mut self, node: NodePtr<K, V>) -> RedwoodNode<K, V> {
        let ptr = node.as_non_null();

        unsafe {
            let owned = ptr.as_ptr().read();
            self.allocator.free(ptr.cast(), Layout::new::<RedwoodNode<K, V>>());
            owned
        }
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_position(key).node.map(|node| unsafe { node.value() })
    }

    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_position(key).node.map(|node| unsafe { node.value_mut() })
    }

    pub fn find_node(&self, key: &K) -> Option<&RedwoodNode<K, V>> {
        self.find_position(key).node.map(|node| unsafe { node.as_ref() })
    }

    /// Pointer to the node holding `key`, for use with
    /// [`remove_node`](Self::remove_node) and
    /// [`cursor_mut_from_ptr`](Self::cursor_mut_from_ptr).
    pub fn find_node_ptr(&self, key: &K) -> Option<NonNull<RedwoodNode<K, V>>> {
        self.find_position(key).node.map(NodePtr::as_non_null)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_position(key).node.is_some()
    }

    /// Inserts `key` with `value`, or overwrites the value if the key is
    /// already present. Returns the previous value.
    pub fn upsert(&mut self, key: K, value: V) -> Option<V> {
        let mut cursor = self.cursor_find_mut(&key);

        if let Some(slot) = cursor.value_mut() {
            return Some(mem::replace(slot, value));
        }

        cursor.insert(key, value);
        None
    }

    /// Removes `key` from the tree, returning its value if it was present.
    ///
    /// # Panics
    ///
    /// Panics on an intrusive tree when `key` is present, before touching the
    /// tree. Use [`CursorMut::remove_node`] there.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let cursor = self.cursor_find_mut(key);
        if !cursor.is_found() {
            return None;
        }

        Some(cursor.remove().1)
    }

    /// Removes the given node and returns its value.
    ///
    /// When the node has two children its in-order successor takes over its
    /// position; the successor keeps its address.
    ///
    /// # Panics
    ///
    /// Panics on an intrusive tree, before touching the tree.
    ///
    /// # Safety
    ///
    /// `node` must point to a node currently linked into this tree.
    pub unsafe fn remove_node(&mut self, node: NonNull<RedwoodNode<K, V>>) -> V {
        unsafe { self.cursor_mut_from_ptr(node) }.remove().1
    }

    /// Removes every node. Owning trees drop all keys and values and free the
    /// storage; intrusive trees only release the links of the caller's nodes.
    pub fn remove_all(&mut self) {
        log::debug!(
            "removing all {} nodes (freeing storage: {})",
            self.num_nodes,
            A::OWNS_NODES
        );

        let depth_hint = 2 * (self.num_nodes + 1).ilog2() as usize + 1;
        let mut to_delete = Vec::with_capacity(depth_hint);
        to_delete.extend(self.root.take());

        while let Some(node) = to_delete.pop() {
            unsafe {
                to_delete.extend(node.left());
                to_delete.extend(node.right());

                if A::OWNS_NODES {
                    drop(self.free_node(node));
                } else {
                    node.clear_links();
                }
            }
        }

        self.num_nodes = 0;
        self.first = None;
    }

    /// Node with the greatest key less than or equal to `key`.
    pub fn closest_leq(&self, key: &K) -> Option<&RedwoodNode<K, V>> {
        let cursor = self.cursor_find(key);
        if cursor.is_found() {
            cursor.node()
        } else {
            cursor.prev().node()
        }
    }

    /// Node with the smallest key strictly greater than `key`.
    pub fn closest_gt(&self, key: &K) -> Option<&RedwoodNode<K, V>> {
        self.cursor_find(key).next().node()
    }

    /// Calls `f` on every node in ascending key order.
    pub fn visit_in_order<F>(&self, mut f: F)
    where
        F: FnMut(&RedwoodNode<K, V>),
    {
        let mut node = self.first;

        while let Some(current) = node {
            unsafe {
                f(current.as_ref());
                node = current.next();
            }
        }
    }

    /// Calls `f` in ascending key order on every node with a key in
    /// `[from, to)`.
    pub fn visit_range_in_order<F>(&self, from: &K, to: &K, mut f: F)
    where
        F: FnMut(&RedwoodNode<K, V>),
    {
        let (mut node, end) = self.range_bounds(from, to);

        while let Some(current) = node {
            if node == end {
                break;
            }
            unsafe {
                f(current.as_ref());
                node = current.next();
            }
        }
    }

    /// First node of `[from, to)` and the node right past it.
    pub(crate) fn range_bounds(&self, from: &K, to: &K) -> (Link<K, V>, Link<K, V>) {
        let ordering = C::cmp(from, to);
        debug_assert!(
            ordering != Ordering::Greater,
            "range start must not be greater than its end"
        );
        if ordering != Ordering::Less {
            return (None, None);
        }

        let lower_bound = |key: &K| {
            let cursor = self.cursor_find(key);
            if cursor.is_found() {
                cursor.node()
            } else {
                cursor.next().node()
            }
        };

        let start = lower_bound(from).map(NodePtr::from_ref);
        let end = lower_bound(to).map(NodePtr::from_ref);
        (start, end)
    }
}

impl<K, V, C: Comparator<K>, A: NodeAllocator> Drop for Redwood<K, V, C, A> {
    fn drop(&mut self) {
        if A::OWNS_NODES {
            self.remove_all();
        }
    }
}

impl<K, V, C: Comparator<K>, A: NodeAllocator + Default> Default for Redwood<K, V, C, A> {
    fn default() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Comparator<K>, A: NodeAllocator> fmt::Debug
    for Redwood<K, V, C, A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
