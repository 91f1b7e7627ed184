use core::cmp::Ordering;

use crate::allocator::NodeAllocator;
use crate::compare::Comparator;
use crate::node::{Link, NodePtr};
use crate::Redwood;

impl<K, V, C: Comparator<K>, A: NodeAllocator> Redwood<K, V, C, A> {
    /// Walks the whole tree and panics on the first broken red-black or
    /// bookkeeping invariant.
    pub fn verify_self(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.num_nodes, 0, "empty tree reports a non-zero size");
            assert!(self.first.is_none(), "empty tree has a first node");
            return;
        };

        unsafe {
            // The root may be red, it lies on every path either way.
            assert!(root.parent().is_none(), "root has a parent");

            let mut leftmost = root;
            let mut black_height = 0;
            let mut node = Some(root);
            while let Some(current) = node {
                if current.is_black() {
                    black_height += 1;
                }
                leftmost = current;
                node = current.left();
            }
            assert_eq!(self.first, Some(leftmost), "first is not the leftmost node");

            let max_depth = 2 * (self.num_nodes + 1).ilog2() as usize;
            let mut count = 0;
            self.verify_subtree(root, None, None, black_height, 1, max_depth, &mut count);

            assert_eq!(count, self.num_nodes, "node count does not match the tree size");
        }
    }

    #[allow(clippy::too_many_arguments)]
    unsafe fn verify_subtree(
        &self,
        node: NodePtr<K, V>,
        lower: Link<K, V>,
        upper: Link<K, V>,
        black_height: usize,
        depth: usize,
        max_depth: usize,
        count: &mut usize,
    ) {
        *count += 1;
        assert!(depth <= max_depth, "tree is deeper than 2*log2(n + 1)");

        unsafe {
            if let Some(lower) = lower {
                assert_eq!(C::cmp(lower.key(), node.key()), Ordering::Less, "keys out of order");
            }
            if let Some(upper) = upper {
                assert_eq!(C::cmp(node.key(), upper.key()), Ordering::Less, "keys out of order");
            }

            let black_height = if node.is_black() {
                let Some(remaining) = black_height.checked_sub(1) else {
                    panic!("black height differs between paths");
                };
                remaining
            } else {
                black_height
            };

            for (child, lower, upper) in [
                (node.left(), lower, Some(node)),
                (node.right(), Some(node), upper),
            ] {
                let Some(child) = child else {
                    assert_eq!(black_height, 0, "black height differs between paths");
                    continue;
                };

                assert_eq!(child.parent(), Some(node), "child does not link back to its parent");
                assert!(
                    node.is_black() || child.is_black(),
                    "red node has a red child"
                );

                self.verify_subtree(child, lower, upper, black_height, depth + 1, max_depth, count);
            }
        }
    }
}
