use core::cmp::Ordering;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::allocator::NodeAllocator;
use crate::compare::Comparator;
use crate::node::{Link, NodePtr, RedwoodNode, Side};
use crate::Redwood;

/// A location in the tree: either an existing node, or the empty child slot of
/// `parent` where a key belongs.
pub(crate) struct Position<K, V> {
    pub(crate) parent: Link<K, V>,
    /// Slot of `parent` this position refers to, meaningless when `parent` is
    /// `None` (the root slot).
    pub(crate) side: Side,
    pub(crate) node: Link<K, V>,
}

impl<K, V> Clone for Position<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Position<K, V> {}

impl<K, V> Position<K, V> {
    pub(crate) unsafe fn of(node: NodePtr<K, V>) -> Self {
        unsafe {
            Self {
                parent: node.parent(),
                side: node.side().unwrap_or(Side::Left),
                node: Some(node),
            }
        }
    }

    /// Neighbouring node towards `side`, `None` past either end of the tree.
    pub(crate) unsafe fn step(self, side: Side) -> Option<Self> {
        unsafe {
            if let Some(node) = self.node {
                return node.step(side).map(|node| Self::of(node));
            }

            let parent = self.parent?;
            if self.side == side.opposite() {
                Some(Self::of(parent))
            } else {
                parent.step(side).map(|node| Self::of(node))
            }
        }
    }
}

impl<K, V, C: Comparator<K>, A: NodeAllocator> Redwood<K, V, C, A> {
    pub(crate) fn find_position(&self, key: &K) -> Position<K, V> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(node) = current {
            let node_side = match C::cmp(key, unsafe { node.key() }) {
                Ordering::Equal => break,
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            parent = Some(node);
            side = node_side;
            current = unsafe { node.child(side) };
        }

        Position {
            parent,
            side,
            node: current,
        }
    }

    /// Whether `key` may sit at `position` without breaking the order against
    /// its in-order neighbours.
    pub(crate) fn fits(&self, position: Position<K, V>, key: &K) -> bool {
        let below = unsafe { position.step(Side::Left) }.and_then(|p| p.node);
        let above = unsafe { position.step(Side::Right) }.and_then(|p| p.node);

        below.is_none_or(|below| C::cmp(unsafe { below.key() }, key) == Ordering::Less)
            && above.is_none_or(|above| C::cmp(key, unsafe { above.key() }) == Ordering::Less)
    }

    /// Returns a cursor at `key`, or at the empty slot where `key` belongs.
    pub fn cursor_find(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(Some(self.find_position(key)))
    }

    pub fn cursor_find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, C, A> {
        let position = self.find_position(key);
        CursorMut {
            tree: self,
            position: Some(position),
        }
    }

    /// Returns a cursor denoting `node`.
    ///
    /// `node` must belong to this tree, for instance as returned by
    /// [`find_node`](Self::find_node).
    pub fn cursor<'a>(&'a self, node: &'a RedwoodNode<K, V>) -> Cursor<'a, K, V> {
        Cursor::new(Some(unsafe { Position::of(NodePtr::from_ref(node)) }))
    }

    /// Returns a cursor at the smallest key, invalid if the tree is empty.
    pub fn cursor_first(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.first.map(|node| unsafe { Position::of(node) }))
    }

    /// Returns a mutable cursor denoting the node behind `node`.
    ///
    /// # Safety
    ///
    /// `node` must point to a node currently linked into this tree.
    pub unsafe fn cursor_mut_from_ptr(
        &mut self,
        node: NonNull<RedwoodNode<K, V>>,
    ) -> CursorMut<'_, K, V, C, A> {
        let position = unsafe { Position::of(NodePtr::new(node)) };
        CursorMut {
            tree: self,
            position: Some(position),
        }
    }
}

/// Read-only location in a [`Redwood`], obtained from a single descent.
///
/// A cursor is *valid* when it denotes a location in the tree, and *found* when
/// that location holds a node. Moving past either end of the tree makes it
/// invalid.
pub struct Cursor<'a, K, V> {
    position: Option<Position<K, V>>,
    _marker: PhantomData<&'a RedwoodNode<K, V>>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    fn new(position: Option<Position<K, V>>) -> Self {
        Self {
            position,
            _marker: PhantomData,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_found(&self) -> bool {
        self.position.is_some_and(|position| position.node.is_some())
    }

    pub fn node(&self) -> Option<&'a RedwoodNode<K, V>> {
        self.position
            .and_then(|position| position.node)
            .map(|node| unsafe { node.as_ref() })
    }

    pub fn key(&self) -> Option<&'a K> {
        self.node().map(RedwoodNode::key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.node().map(RedwoodNode::value)
    }

    /// Cursor at the next node in key order.
    ///
    /// From an empty slot this is the smallest node whose key is greater than
    /// the key the slot was looked up with.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::new(self.position.and_then(|position| unsafe { position.step(Side::Right) }))
    }

    /// Cursor at the previous node in key order.
    #[must_use]
    pub fn prev(&self) -> Self {
        Self::new(self.position.and_then(|position| unsafe { position.step(Side::Left) }))
    }
}

/// Location in a [`Redwood`] that can insert, remove or replace in place
/// without searching again.
pub struct CursorMut<'a, K, V, C: Comparator<K>, A: NodeAllocator> {
    tree: &'a mut Redwood<K, V, C, A>,
    position: Option<Position<K, V>>,
}

impl<'a, K, V, C: Comparator<K>, A: NodeAllocator> CursorMut<'a, K, V, C, A> {
    pub fn is_valid(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_found(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Link<K, V> {
        self.position.and_then(|position| position.node)
    }

    pub fn node(&self) -> Option<&RedwoodNode<K, V>> {
        self.current().map(|node| unsafe { node.as_ref() })
    }

    pub fn key(&self) -> Option<&K> {
        self.current().map(|node| unsafe { node.key() })
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current().map(|node| unsafe { node.value_mut() })
    }

    /// Pointer to the current node, as accepted by
    /// [`Redwood::cursor_mut_from_ptr`] and [`Redwood::remove_node`].
    pub fn node_ptr(&self) -> Option<NonNull<RedwoodNode<K, V>>> {
        self.current().map(NodePtr::as_non_null)
    }

    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.position)
    }

    pub fn move_next(&mut self) {
        self.position = self.position.and_then(|position| unsafe { position.step(Side::Right) });
    }

    pub fn move_prev(&mut self) {
        self.position = self.position.and_then(|position| unsafe { position.step(Side::Left) });
    }

    fn empty_slot(&self) -> Position<K, V> {
        let Some(position) = self.position else {
            panic!("insert through an invalid cursor");
        };
        assert!(position.node.is_none(), "insert at a cursor that already holds a node");
        position
    }

    fn assert_owning() {
        assert!(
            A::OWNS_NODES,
            "intrusive tree cannot allocate or free nodes, use the `_node` variants"
        );
    }

    fn occupied(&self) -> (Position<K, V>, NodePtr<K, V>) {
        match self.position {
            Some(position @ Position { node: Some(node), .. }) => (position, node),
            _ => panic!("cursor does not point to a node"),
        }
    }

    /// Allocates a node for `key` and `value` and links it at the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid or already holds a node, or if the tree
    /// is intrusive.
    pub fn insert(self, key: K, value: V) -> &'a mut V {
        Self::assert_owning();
        let position = self.empty_slot();
        debug_assert!(self.tree.fits(position, &key), "key does not belong at this cursor");

        let node = self.tree.allocate_node(key, value);
        unsafe {
            self.tree.link_at(node, position);
            node.value_mut()
        }
    }

    /// Links a caller-owned node at the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid or already holds a node.
    ///
    /// # Safety
    ///
    /// `node` must point to a valid, unlinked node that stays at the same
    /// address and is not accessed mutably until it is removed from the tree.
    pub unsafe fn insert_node(self, node: NonNull<RedwoodNode<K, V>>) {
        let position = self.empty_slot();
        let node = NodePtr::new(node);
        debug_assert!(
            self.tree.fits(position, unsafe { node.key() }),
            "key does not belong at this cursor"
        );

        unsafe { self.tree.link_at(node, position) }
    }

    /// Removes the current node and frees it, returning its key and value.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not hold a node, or if the tree is intrusive.
    pub fn remove(self) -> (K, V) {
        Self::assert_owning();
        let (_, node) = self.occupied();

        unsafe {
            self.tree.unlink(node);
            self.tree.free_node(node).into_parts()
        }
    }

    /// Unlinks the current node without freeing it and hands it back.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not hold a node.
    pub fn remove_node(self) -> NonNull<RedwoodNode<K, V>> {
        let (_, node) = self.occupied();

        unsafe { self.tree.unlink(node) };
        node.as_non_null()
    }

    /// Replaces the current node with a newly allocated node and frees the old
    /// one, returning its key and value. The cursor then denotes the new node.
    ///
    /// `key` must order the same way as the key it replaces against every other
    /// key in the tree.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not hold a node, or if the tree is intrusive.
    pub fn replace(&mut self, key: K, value: V) -> (K, V) {
        Self::assert_owning();
        let (position, _) = self.occupied();
        debug_assert!(self.tree.fits(position, &key), "replacement key breaks the order");

        let new = self.tree.allocate_node(key, value);
        unsafe {
            let old = self.tree.replace_at(position, new);
            log::trace!("replaced node {old:?} with {new:?}");

            self.position = Some(Position { node: Some(new), ..position });
            self.tree.free_node(old).into_parts()
        }
    }

    /// Puts a caller-owned node in place of the current one and hands back the
    /// old node, now unlinked. The cursor then denotes `new`.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not hold a node.
    ///
    /// # Safety
    ///
    /// Same requirements on `new` as [`insert_node`](Self::insert_node), in
    /// particular `new` must not be the current node; its key must order the
    /// same way as the replaced key against every other key.
    pub unsafe fn replace_node(
        &mut self,
        new: NonNull<RedwoodNode<K, V>>,
    ) -> NonNull<RedwoodNode<K, V>> {
        let (position, old) = self.occupied();
        let new = NodePtr::new(new);
        debug_assert_ne!(old, new, "node replaced by itself");
        debug_assert!(
            self.tree.fits(position, unsafe { new.key() }),
            "replacement key breaks the order"
        );

        let old = unsafe { self.tree.replace_at(position, new) };
        self.position = Some(Position { node: Some(new), ..position });
        old.as_non_null()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::cmp::Ordering;
    use core::ptr::NonNull;

    use crate::{IntrusiveRedwood, Redwood, RedwoodNode};

    #[test]
    pub fn cursor_empty_tree() {
        let tree = Redwood::<i32, i32>::new();

        assert!(!tree.cursor_first().is_valid());

        let cursor = tree.cursor_find(&0);
        assert!(cursor.is_valid());
        assert!(!cursor.is_found());
        assert!(!cursor.next().is_valid());
        assert!(!cursor.prev().is_valid());
    }

    #[test]
    pub fn cursor_iterate() {
        let mut tree = Redwood::new();
        for n in 0..=100 {
            tree.upsert(n, n);
        }

        let mut cursor = tree.cursor_find(&0);
        for n in 0..=100 {
            assert!(cursor.is_valid());
            assert_eq!(cursor.value(), Some(&n));
            cursor = cursor.next();
        }
        assert!(!cursor.is_valid());

        let mut cursor = tree.cursor_find(&100);
        for n in (0..=100).rev() {
            assert!(cursor.is_valid());
            assert_eq!(cursor.value(), Some(&n));
            cursor = cursor.prev();
        }
        assert!(!cursor.is_valid());
    }

    #[test]
    pub fn cursor_round_trip() {
        let mut tree = Redwood::new();
        for n in [50, 20, 80, 10, 30, 70, 90, 25, 75] {
            tree.upsert(n, ());
        }

        let mut cursor = tree.cursor_first().next();
        while cursor.next().is_valid() {
            let here = cursor.node().map(core::ptr::from_ref);

            assert_eq!(cursor.next().prev().node().map(core::ptr::from_ref), here);
            assert_eq!(cursor.prev().next().node().map(core::ptr::from_ref), here);

            cursor = cursor.next();
        }
    }

    #[test]
    pub fn empty_slot_neighbours() {
        let mut tree = Redwood::new();
        for n in [10, 20, 30, 40] {
            tree.upsert(n, ());
        }

        for (probe, below, above) in [(5, None, Some(10)), (25, Some(20), Some(30)), (45, Some(40), None)] {
            let cursor = tree.cursor_find(&probe);

            assert!(cursor.is_valid());
            assert!(!cursor.is_found());
            assert_eq!(cursor.prev().key().copied(), below);
            assert_eq!(cursor.next().key().copied(), above);
        }
    }

    #[test]
    pub fn cursor_for_node() {
        let mut tree = Redwood::new();
        for n in 0..10 {
            tree.upsert(n, n * 2);
        }

        let node = tree.find_node(&4).unwrap();
        let cursor = tree.cursor(node);
        assert!(cursor.is_found());
        assert_eq!(cursor.next().key(), Some(&5));
        assert_eq!(cursor.prev().key(), Some(&3));
    }

    #[test]
    pub fn insert_remove_at_cursor() {
        let mut tree = Redwood::new();
        for n in [1, 3, 5] {
            tree.upsert(n, n);
        }

        let cursor = tree.cursor_find_mut(&4);
        assert!(!cursor.is_found());
        *cursor.insert(4, 0) = 40;
        assert_eq!(tree.find(&4), Some(&40));
        tree.verify_self();

        let mut cursor = tree.cursor_find_mut(&3);
        cursor.move_next();
        assert_eq!(cursor.key(), Some(&4));
        assert_eq!(cursor.remove(), (4, 40));
        assert_eq!(tree.len(), 3);
        tree.verify_self();

        let mut cursor = tree.cursor_find_mut(&5);
        cursor.move_next();
        assert!(!cursor.is_valid());
    }

    #[test]
    #[should_panic(expected = "insert at a cursor that already holds a node")]
    pub fn insert_at_found_cursor_panics() {
        let mut tree = Redwood::new();
        tree.upsert(1, ());

        tree.cursor_find_mut(&1).insert(1, ());
    }

    #[test]
    #[should_panic(expected = "cursor does not point to a node")]
    pub fn remove_at_empty_slot_panics() {
        let mut tree = Redwood::<i32, ()>::new();
        tree.upsert(1, ());

        tree.cursor_find_mut(&2).remove();
    }

    #[test]
    pub fn replace_keeps_position() {
        let mut tree = Redwood::new();
        for n in 0..20 {
            tree.upsert(n, n);
        }

        let mut cursor = tree.cursor_find_mut(&7);
        assert_eq!(cursor.replace(7, 700), (7, 7));
        assert_eq!(cursor.value_mut().copied(), Some(700));
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&6));

        tree.verify_self();
        assert_eq!(tree.len(), 20);
        assert_eq!(tree.find(&7), Some(&700));
    }

    #[repr(C)]
    struct IntrusiveHolder {
        node: RedwoodNode<i32>,
        data: i32,
    }

    impl IntrusiveHolder {
        fn new_boxed(data: i32) -> NonNull<RedwoodNode<i32>> {
            let holder = Box::new(IntrusiveHolder {
                node: RedwoodNode::new_isolated(data),
                data,
            });
            NonNull::from(Box::leak(holder)).cast()
        }

        unsafe fn cast_to_self<'a>(node: NonNull<RedwoodNode<i32>>) -> &'a IntrusiveHolder {
            unsafe { node.cast::<IntrusiveHolder>().as_ref() }
        }

        unsafe fn free(node: NonNull<RedwoodNode<i32>>) {
            drop(unsafe { Box::from_raw(node.cast::<IntrusiveHolder>().as_ptr()) });
        }
    }

    #[test]
    pub fn intrusive() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();

        for n in 0..100 {
            let cursor = tree.cursor_find_mut(&n);
            assert!(!cursor.is_found());

            unsafe { cursor.insert_node(IntrusiveHolder::new_boxed(n)) };
            assert!(tree.cursor_find(&n).is_found());
            tree.verify_self();
        }

        for n in 0..100 {
            let cursor = tree.cursor_find_mut(&n);
            let node = cursor.node_ptr().unwrap();
            assert_eq!(unsafe { IntrusiveHolder::cast_to_self(node) }.data, n);
        }

        for n in 0..100 {
            let node = tree.cursor_find_mut(&n).remove_node();
            assert!(!tree.cursor_find(&n).is_found());
            tree.verify_self();

            let holder = unsafe { IntrusiveHolder::cast_to_self(node) };
            assert_eq!(holder.data, n);
            assert!(!holder.node.has_links());
            unsafe { IntrusiveHolder::free(node) };
        }

        assert!(tree.is_empty());
    }

    #[test]
    pub fn intrusive_replace_and_reinsert() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();
        for n in 0..8 {
            unsafe { tree.cursor_find_mut(&n).insert_node(IntrusiveHolder::new_boxed(n)) };
        }

        let replacement = IntrusiveHolder::new_boxed(3);
        let old = unsafe { tree.cursor_find_mut(&3).replace_node(replacement) };
        assert_eq!(tree.cursor_find_mut(&3).node_ptr(), Some(replacement));
        assert!(!unsafe { IntrusiveHolder::cast_to_self(old) }.node.has_links());
        tree.verify_self();

        // A released node can go back into the tree.
        let removed = tree.cursor_find_mut(&3).remove_node();
        assert_eq!(removed, replacement);
        unsafe { tree.cursor_find_mut(&3).insert_node(old) };
        assert_eq!(tree.cursor_find_mut(&3).node_ptr(), Some(old));
        tree.verify_self();
        unsafe { IntrusiveHolder::free(removed) };

        for n in 0..8 {
            let node = tree.cursor_find_mut(&n).remove_node();
            unsafe { IntrusiveHolder::free(node) };
        }
        assert!(tree.is_empty());
    }

    #[test]
    pub fn intrusive_remove_all_releases_nodes() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();
        let nodes: Vec<_> = (0..50).map(IntrusiveHolder::new_boxed).collect();

        for (n, &node) in (0..50).zip(&nodes) {
            unsafe { tree.cursor_find_mut(&n).insert_node(node) };
        }
        tree.remove_all();

        assert_eq!(tree.len(), 0);
        assert!(tree.first().is_none());
        tree.verify_self();
        for (n, &node) in (0..50).zip(&nodes) {
            let holder = unsafe { IntrusiveHolder::cast_to_self(node) };
            assert!(!holder.node.has_links());
            assert_eq!(holder.data, n);
        }

        // Released nodes go back in, in any order.
        for (n, &node) in (0..50).zip(&nodes).rev() {
            unsafe { tree.cursor_find_mut(&n).insert_node(node) };
        }
        assert_eq!(tree.len(), 50);
        tree.verify_self();

        tree.remove_all();
        for node in nodes {
            unsafe { IntrusiveHolder::free(node) };
        }
    }

    #[test]
    pub fn intrusive_drop_leaves_nodes_to_the_caller() {
        let nodes: Vec<_> = (0..10).map(IntrusiveHolder::new_boxed).collect();

        {
            let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();
            for (n, &node) in (0..10).zip(&nodes) {
                unsafe { tree.cursor_find_mut(&n).insert_node(node) };
            }
        }

        for (n, node) in (0..10).zip(nodes) {
            let holder = unsafe { IntrusiveHolder::cast_to_self(node) };
            assert_eq!(*holder.node.key(), n);
            assert_eq!(holder.data, n);
            unsafe { IntrusiveHolder::free(node) };
        }
    }

    struct CountedKey {
        key: i32,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for CountedKey {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl PartialEq for CountedKey {
        fn eq(&self, other: &Self) -> bool {
            self.key == other.key
        }
    }

    impl Eq for CountedKey {}

    impl PartialOrd for CountedKey {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for CountedKey {
        fn cmp(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }
    }

    #[test]
    pub fn intrusive_remove_by_key_leaves_tree_untouched() {
        let drops = Rc::new(Cell::new(0));
        let counted = |key| CountedKey {
            key,
            drops: Rc::clone(&drops),
        };

        let mut tree: IntrusiveRedwood<CountedKey> = IntrusiveRedwood::default();
        let nodes: Vec<NonNull<RedwoodNode<CountedKey>>> = (0..3)
            .map(|n| NonNull::from(Box::leak(Box::new(RedwoodNode::new_isolated(counted(n))))))
            .collect();
        for (n, &node) in (0..3).zip(&nodes) {
            unsafe { tree.cursor_find_mut(&counted(n)).insert_node(node) };
        }

        let key = counted(1);
        let drops_before = drops.get();
        let result = std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| tree.remove(&key)));

        assert!(result.is_err());
        assert_eq!(drops.get(), drops_before);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find_node_ptr(&key), Some(nodes[1]));
        tree.verify_self();
        drop(key);

        for n in 0..3 {
            let node = tree.cursor_find_mut(&counted(n)).remove_node();
            drop(unsafe { Box::from_raw(node.as_ptr()) });
        }

        // Three embedded keys, three insert lookups, one removal key and three
        // release lookups, each dropped exactly once.
        assert_eq!(drops.get(), 10);
    }

    #[test]
    #[should_panic(expected = "intrusive tree cannot allocate or free nodes")]
    pub fn intrusive_replace_by_value_panics() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();
        unsafe { tree.cursor_find_mut(&1).insert_node(IntrusiveHolder::new_boxed(1)) };

        tree.cursor_find_mut(&1).replace(1, ());
    }

    #[test]
    #[should_panic(expected = "intrusive tree cannot allocate or free nodes")]
    pub fn intrusive_insert_by_value_panics() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();

        tree.cursor_find_mut(&1).insert(1, ());
    }

    #[test]
    #[should_panic(expected = "node replaced by itself")]
    pub fn replace_node_with_itself_panics() {
        let mut tree: IntrusiveRedwood<i32> = IntrusiveRedwood::default();
        let node = IntrusiveHolder::new_boxed(1);
        unsafe { tree.cursor_find_mut(&1).insert_node(node) };

        unsafe { tree.cursor_find_mut(&1).replace_node(node) };
    }
}
