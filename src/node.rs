use core::fmt;
use core::ptr::NonNull;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeColor {
    #[default]
    Red,
    Black,
}

/// Child slot of a node, also used as a direction when walking or rotating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;

/// A single entry of a [`Redwood`](crate::Redwood) tree.
///
/// In owning mode nodes are allocated by the tree and are only ever handed out
/// behind a borrow of the tree. In intrusive mode the caller embeds a node
/// (usually as the first field of a `#[repr(C)]` struct) and passes a pointer to
/// it to [`CursorMut::insert_node`](crate::CursorMut::insert_node).
///
/// A node never moves while it is linked: its address stays valid and identifies
/// the same key until it is removed.
pub struct RedwoodNode<K, V = ()> {
    parent: Link<K, V>,
    left: Link<K, V>,
    right: Link<K, V>,
    color: NodeColor,
    key: K,
    value: V,
}

impl<K, V> RedwoodNode<K, V> {
    pub const fn new(key: K, value: V) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            color: NodeColor::Red,
            key,
            value,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn color(&self) -> NodeColor {
        self.color
    }

    /// Returns `true` if the node currently has a parent or a child.
    ///
    /// A tree holding a single node links nothing, so this is only a hint for
    /// intrusive callers checking that a removed node was released.
    pub fn has_links(&self) -> bool {
        self.parent.is_some() || self.left.is_some() || self.right.is_some()
    }

    /// Nodes with two children are the ones whose removal moves their in-order
    /// successor into their place.
    pub fn has_two_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K> RedwoodNode<K> {
    /// Creates an unlinked node without payload, for intrusive trees.
    pub const fn new_isolated(key: K) -> Self {
        Self::new(key, ())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RedwoodNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedwoodNode")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

/// Raw link to a node reachable from a tree.
///
/// All accessors are `unsafe`: the caller guarantees the pointee is alive and
/// that no reference to the same field is held across the call.
pub(crate) struct NodePtr<K, V>(NonNull<RedwoodNode<K, V>>);

impl<K, V> Clone for NodePtr<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodePtr<K, V> {}

impl<K, V> PartialEq for NodePtr<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K, V> Eq for NodePtr<K, V> {}

impl<K, V> fmt::Debug for NodePtr<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePtr({:p})", self.0)
    }
}

impl<K, V> NodePtr<K, V> {
    pub(crate) fn new(ptr: NonNull<RedwoodNode<K, V>>) -> Self {
        Self(ptr)
    }

    pub(crate) fn from_ref(node: &RedwoodNode<K, V>) -> Self {
        Self(NonNull::from(node))
    }

    pub(crate) fn as_non_null(self) -> NonNull<RedwoodNode<K, V>> {
        self.0
    }

    fn raw(self) -> *mut RedwoodNode<K, V> {
        self.0.as_ptr()
    }

    pub(crate) unsafe fn as_ref<'a>(self) -> &'a RedwoodNode<K, V> {
        unsafe { &*self.raw() }
    }

    pub(crate) unsafe fn key<'a>(self) -> &'a K {
        unsafe { &(*self.raw()).key }
    }

    pub(crate) unsafe fn value<'a>(self) -> &'a V {
        unsafe { &(*self.raw()).value }
    }

    pub(crate) unsafe fn value_mut<'a>(self) -> &'a mut V {
        unsafe { &mut (*self.raw()).value }
    }

    pub(crate) unsafe fn parent(self) -> Link<K, V> {
        unsafe { (*self.raw()).parent }
    }

    pub(crate) unsafe fn set_parent(self, parent: Link<K, V>) {
        unsafe { (*self.raw()).parent = parent }
    }

    pub(crate) unsafe fn left(self) -> Link<K, V> {
        unsafe { (*self.raw()).left }
    }

    pub(crate) unsafe fn right(self) -> Link<K, V> {
        unsafe { (*self.raw()).right }
    }

    pub(crate) unsafe fn child(self, side: Side) -> Link<K, V> {
        match side {
            Side::Left => unsafe { self.left() },
            Side::Right => unsafe { self.right() },
        }
    }

    pub(crate) unsafe fn set_child(self, side: Side, child: Link<K, V>) {
        match side {
            Side::Left => unsafe { (*self.raw()).left = child },
            Side::Right => unsafe { (*self.raw()).right = child },
        }
    }

    pub(crate) unsafe fn color(self) -> NodeColor {
        unsafe { (*self.raw()).color }
    }

    pub(crate) unsafe fn set_color(self, color: NodeColor) {
        unsafe { (*self.raw()).color = color }
    }

    pub(crate) unsafe fn is_red(self) -> bool {
        unsafe { self.color() == NodeColor::Red }
    }

    pub(crate) unsafe fn is_black(self) -> bool {
        unsafe { self.color() == NodeColor::Black }
    }

    /// Which child slot of its parent this node occupies, `None` for the root.
    pub(crate) unsafe fn side(self) -> Option<Side> {
        let parent = unsafe { self.parent() }?;

        if unsafe { parent.left() } == Some(self) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    pub(crate) unsafe fn replace_child(self, old_child: Self, new_child: Link<K, V>) {
        unsafe {
            if self.left() == Some(old_child) {
                self.set_child(Side::Left, new_child);
            } else if self.right() == Some(old_child) {
                self.set_child(Side::Right, new_child);
            }
        }
    }

    /// Resets the node to the state of a freshly constructed one.
    pub(crate) unsafe fn clear_links(self) {
        unsafe {
            let node = &mut *self.raw();
            node.parent = None;
            node.left = None;
            node.right = None;
            node.color = NodeColor::Red;
        }
    }

    /// In-order neighbour towards `side`: the successor for `Side::Right`,
    /// the predecessor for `Side::Left`.
    pub(crate) unsafe fn step(self, side: Side) -> Link<K, V> {
        unsafe {
            if let Some(mut node) = self.child(side) {
                while let Some(next) = node.child(side.opposite()) {
                    node = next;
                }
                return Some(node);
            }

            let mut node = self;
            while let Some(parent) = node.parent() {
                if parent.child(side) != Some(node) {
                    return Some(parent);
                }
                node = parent;
            }

            None
        }
    }

    pub(crate) unsafe fn next(self) -> Link<K, V> {
        unsafe { self.step(Side::Right) }
    }

    #[cfg(test)]
    pub(crate) unsafe fn prev(self) -> Link<K, V> {
        unsafe { self.step(Side::Left) }
    }
}

pub(crate) fn is_red<K, V>(node: Link<K, V>) -> bool {
    node.is_some_and(|node| unsafe { node.is_red() })
}

pub(crate) fn is_black<K, V>(node: Link<K, V>) -> bool {
    !is_red(node)
}
