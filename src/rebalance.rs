use crate::allocator::NodeAllocator;
use crate::compare::Comparator;
use crate::cursor::Position;
use crate::node::{NodeColor, NodePtr, Side, is_black, is_red};
use crate::Redwood;

impl<K, V, C: Comparator<K>, A: NodeAllocator> Redwood<K, V, C, A> {
    /// Moves `center` one level down towards `down`, pulling its child on the
    /// other side up into its place. Returns the node that moved up.
    ///
    /// Colors and the in-order sequence are left untouched.
    pub(crate) unsafe fn rotate(&mut self, center: NodePtr<K, V>, down: Side) -> NodePtr<K, V> {
        let up = down.opposite();

        unsafe {
            let Some(pivot) = center.child(up) else {
                unreachable!("rotation without a child to pull up");
            };

            let inner = pivot.child(down);
            center.set_child(up, inner);
            if let Some(inner) = inner {
                inner.set_parent(Some(center));
            }

            let grandparent = center.parent();
            pivot.set_parent(grandparent);
            match grandparent {
                Some(grandparent) => grandparent.replace_child(center, Some(pivot)),
                None => self.root = Some(pivot),
            }

            pivot.set_child(down, Some(center));
            center.set_parent(Some(pivot));

            pivot
        }
    }

    #[cfg(test)]
    pub(crate) unsafe fn rotate_left(&mut self, center: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe { self.rotate(center, Side::Left) }
    }

    #[cfg(test)]
    pub(crate) unsafe fn rotate_right(&mut self, center: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe { self.rotate(center, Side::Right) }
    }

    /// Links `node` into the empty slot described by `position` and restores
    /// the red-black properties.
    pub(crate) unsafe fn link_at(&mut self, node: NodePtr<K, V>, position: Position<K, V>) {
        debug_assert!(position.node.is_none(), "insert position is occupied");
        self.num_nodes += 1;

        if self.first.is_none() || (position.side == Side::Left && position.parent == self.first) {
            self.first = Some(node);
        }

        unsafe {
            node.clear_links();
            node.set_parent(position.parent);

            match position.parent {
                Some(parent) => parent.set_child(position.side, Some(node)),
                None => {
                    self.root = Some(node);
                    return;
                }
            }

            self.fix_insert_violations(node);
        }
    }

    unsafe fn fix_insert_violations(&mut self, start: NodePtr<K, V>) {
        let mut node = start;

        unsafe {
            while let Some(parent) = node.parent() {
                if parent.is_black() {
                    return;
                }

                let Some(grandparent) = parent.parent() else {
                    parent.set_color(NodeColor::Black);
                    return;
                };

                let parent_side = if grandparent.left() == Some(parent) {
                    Side::Left
                } else {
                    Side::Right
                };
                let uncle = grandparent.child(parent_side.opposite());

                if let Some(uncle) = uncle.filter(|uncle| uncle.is_red()) {
                    parent.set_color(NodeColor::Black);
                    uncle.set_color(NodeColor::Black);
                    grandparent.set_color(NodeColor::Red);

                    node = grandparent;
                    continue;
                }

                // Inner grandchild: straighten the path first.
                let mut top = parent;
                if parent.child(parent_side.opposite()) == Some(node) {
                    self.rotate(parent, parent_side);
                    top = node;
                }

                self.rotate(grandparent, parent_side.opposite());
                top.set_color(NodeColor::Black);
                grandparent.set_color(NodeColor::Red);

                return;
            }
        }
    }

    /// Detaches `node` from the tree. On return the node is unlinked and may be
    /// freed or reused by the caller.
    pub(crate) unsafe fn unlink(&mut self, node: NodePtr<K, V>) {
        debug_assert!(self.num_nodes > 0, "unlinking from an empty tree");
        self.num_nodes -= 1;

        unsafe {
            if self.first == Some(node) {
                self.first = node.next();
            }

            if let (Some(_), Some(right)) = (node.left(), node.right()) {
                self.exchange_with_successor(node, right);
            }

            self.remove_from_tree(node);
            node.clear_links();
        }
    }

    /// Swaps the links and colors of `node` with those of its in-order
    /// successor, the leftmost node of `right`. Afterwards `node` has at most
    /// one child and the successor occupies `node`'s former position; neither
    /// node object moves in memory.
    unsafe fn exchange_with_successor(&mut self, node: NodePtr<K, V>, right: NodePtr<K, V>) {
        unsafe {
            let mut successor = right;
            while let Some(left) = successor.left() {
                successor = left;
            }

            if self.root == Some(node) {
                self.root = Some(successor);
            }

            let node_parent = node.parent();
            let node_left = node.left();
            let node_color = node.color();
            let successor_parent = successor.parent();
            let successor_right = successor.right();

            node.set_color(successor.color());
            successor.set_color(node_color);

            successor.set_child(Side::Left, node_left);
            node.set_child(Side::Left, None);

            if successor_parent == Some(node) {
                // The successor is node's right child.
                node.set_child(Side::Right, successor_right);
                node.set_parent(Some(successor));
                successor.set_child(Side::Right, Some(node));
            } else {
                node.set_child(Side::Right, successor_right);
                node.set_parent(successor_parent);
                if let Some(successor_parent) = successor_parent {
                    successor_parent.replace_child(successor, Some(node));
                }

                successor.set_child(Side::Right, Some(right));
                right.set_parent(Some(successor));
            }

            successor.set_parent(node_parent);
            if let Some(node_parent) = node_parent {
                node_parent.replace_child(node, Some(successor));
            }

            if let Some(left) = node_left {
                left.set_parent(Some(successor));
            }
            if let Some(right) = successor_right {
                right.set_parent(Some(node));
            }
        }
    }

    /// Removes a node with at most one child from the tree.
    unsafe fn remove_from_tree(&mut self, node: NodePtr<K, V>) {
        unsafe {
            let parent = node.parent();

            match (node.left(), node.right()) {
                (Some(child), None) | (None, Some(child)) => {
                    // Any other shape would already violate the black-height.
                    debug_assert!(node.is_black(), "node with an only child must be black");
                    debug_assert!(child.is_red(), "only child must be red");

                    child.set_color(NodeColor::Black);
                    child.set_parent(parent);
                    match parent {
                        Some(parent) => parent.replace_child(node, Some(child)),
                        None => self.root = Some(child),
                    }
                }
                (None, None) => match parent {
                    Some(parent) => {
                        if node.is_black() {
                            self.remove_black_leaf(node);
                        }
                        parent.replace_child(node, None);
                    }
                    None => self.root = None,
                },
                (Some(_), Some(_)) => unreachable!("node with two children must be exchanged first"),
            }
        }
    }

    /// Restores the black-height around a black leaf that is about to be
    /// removed. The leaf is still linked while this runs.
    unsafe fn remove_black_leaf(&mut self, leaf: NodePtr<K, V>) {
        let mut node = leaf;

        unsafe {
            while let Some(parent) = node.parent() {
                let side = if parent.left() == Some(node) {
                    Side::Left
                } else {
                    Side::Right
                };
                let far = side.opposite();

                // The removed black node guarantees a sibling on the other side.
                let Some(mut sibling) = parent.child(far) else {
                    unreachable!("black node without a sibling");
                };

                if sibling.is_red() {
                    debug_assert!(parent.is_black(), "parent of a red sibling must be black");
                    debug_assert!(is_black(sibling.left()) && is_black(sibling.right()));

                    parent.set_color(NodeColor::Red);
                    sibling.set_color(NodeColor::Black);
                    self.rotate(parent, side);

                    let Some(new_sibling) = parent.child(far) else {
                        unreachable!("red sibling without children");
                    };
                    sibling = new_sibling;
                }

                let close_nephew = sibling.child(side);
                let mut distant_nephew = sibling.child(far);

                if is_red(close_nephew) || is_red(distant_nephew) {
                    if is_black(distant_nephew) {
                        let Some(close) = close_nephew else {
                            unreachable!("red nephew must exist");
                        };

                        self.rotate(sibling, far);
                        distant_nephew = Some(sibling);
                        sibling.set_color(NodeColor::Red);
                        close.set_color(NodeColor::Black);
                        sibling = close;
                    }

                    self.rotate(parent, side);
                    sibling.set_color(parent.color());
                    parent.set_color(NodeColor::Black);
                    if let Some(distant) = distant_nephew {
                        distant.set_color(NodeColor::Black);
                    }

                    return;
                }

                if parent.is_red() {
                    sibling.set_color(NodeColor::Red);
                    parent.set_color(NodeColor::Black);
                    return;
                }

                sibling.set_color(NodeColor::Red);
                node = parent;
            }
        }
    }

    /// Puts `new` in place of the node at `position`, taking over its color and
    /// links. Returns the node that was replaced, now unlinked.
    pub(crate) unsafe fn replace_at(
        &mut self,
        position: Position<K, V>,
        new: NodePtr<K, V>,
    ) -> NodePtr<K, V> {
        let Some(old) = position.node else {
            unreachable!("replacing an empty position");
        };
        if old == new {
            return old;
        }

        unsafe {
            new.set_parent(position.parent);
            new.set_color(old.color());
            new.set_child(Side::Left, old.left());
            new.set_child(Side::Right, old.right());

            match position.parent {
                Some(parent) => parent.set_child(position.side, Some(new)),
                None => self.root = Some(new),
            }
            if let Some(left) = new.left() {
                left.set_parent(Some(new));
            }
            if let Some(right) = new.right() {
                right.set_parent(Some(new));
            }

            if self.first == Some(old) {
                self.first = Some(new);
            }

            old.clear_links();
        }

        old
    }
}
