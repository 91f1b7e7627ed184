use core::cmp::Ordering;

/// Total order over the keys of a [`Redwood`](crate::Redwood).
///
/// The result for a pair of keys must not change while they are in the same
/// tree; doing so corrupts the ordering of the tree.
pub trait Comparator<K: ?Sized> {
    fn cmp(a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    fn cmp(a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}
