use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::allocator::NodeAllocator;
use crate::compare::Comparator;
use crate::node::{Link, RedwoodNode};
use crate::Redwood;

/// In-order iterator over the entries of a [`Redwood`].
pub struct RedwoodSortedIterator<'a, K, V> {
    pub(crate) curr: Link<K, V>,
    pub(crate) end: Link<K, V>,
    pub(crate) phantom: PhantomData<&'a RedwoodNode<K, V>>,
}

impl<'a, K, V> Iterator for RedwoodSortedIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.curr.filter(|&node| Some(node) != self.end)?;

        unsafe {
            self.curr = node.next();
            Some((node.key(), node.value()))
        }
    }
}

impl<K, V> FusedIterator for RedwoodSortedIterator<'_, K, V> {}

/// In-order iterator over the entries of a [`Redwood`], with mutable values.
///
/// Keys stay immutable, changing them would break the order of the tree.
pub struct RedwoodSortedIteratorMut<'a, K, V> {
    pub(crate) curr: Link<K, V>,
    pub(crate) end: Link<K, V>,
    pub(crate) phantom: PhantomData<&'a mut RedwoodNode<K, V>>,
}

impl<'a, K, V> Iterator for RedwoodSortedIteratorMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.curr.filter(|&node| Some(node) != self.end)?;

        // Each node is yielded once, so the value borrows never alias.
        unsafe {
            self.curr = node.next();
            Some((node.key(), node.value_mut()))
        }
    }
}

impl<K, V> FusedIterator for RedwoodSortedIteratorMut<'_, K, V> {}

impl<K, V, C: Comparator<K>, A: NodeAllocator> Redwood<K, V, C, A> {
    pub fn iter(&self) -> RedwoodSortedIterator<'_, K, V> {
        RedwoodSortedIterator {
            curr: self.first,
            end: None,
            phantom: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> RedwoodSortedIteratorMut<'_, K, V> {
        RedwoodSortedIteratorMut {
            curr: self.first,
            end: None,
            phantom: PhantomData,
        }
    }

    /// Iterates over the entries with a key in `[from, to)`.
    pub fn range(&self, from: &K, to: &K) -> RedwoodSortedIterator<'_, K, V> {
        let (curr, end) = self.range_bounds(from, to);

        RedwoodSortedIterator {
            curr,
            end,
            phantom: PhantomData,
        }
    }
}

impl<'a, K, V, C: Comparator<K>, A: NodeAllocator> IntoIterator for &'a Redwood<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = RedwoodSortedIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C: Comparator<K>, A: NodeAllocator> IntoIterator for &'a mut Redwood<K, V, C, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = RedwoodSortedIteratorMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
