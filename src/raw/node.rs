use super::handle::Handle;

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A reference held in a child or parent slot.
///
/// Child slots hold `Empty` or `Node`. Parent slots hold `Sentinel` (for the root) or `Node`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    /// No child here. Height -1, size 0.
    Empty,
    /// The keyless anchor above the root. Its right child is the root and its left slot is always empty.
    Sentinel,
    /// A real node.
    Node(Handle),
}

impl Link {
    /// Returns true only for real nodes.
    #[inline]
    pub(crate) const fn is_real(self) -> bool {
        matches!(self, Link::Node(_))
    }

    #[inline]
    pub(crate) const fn handle(self) -> Option<Handle> {
        match self {
            Link::Node(handle) => Some(handle),
            Link::Empty | Link::Sentinel => None,
        }
    }
}

impl From<Option<Handle>> for Link {
    fn from(handle: Option<Handle>) -> Self {
        handle.map_or(Link::Empty, Link::Node)
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    // Longest path to an empty slot; 0 for a node with no real children.
    height: i32,
    // Real nodes in this subtree, including this one.
    size: usize,
    left: Link,
    right: Link,
    parent: Link,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf below `parent`.
    pub(crate) fn new(key: K, value: V, parent: Link) -> Self {
        Self {
            key,
            value,
            height: 0,
            size: 1,
            left: Link::Empty,
            right: Link::Empty,
            parent,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replaces the value, returning the old one.
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.value, value)
    }

    /// Exchanges key/value pairs with `other`, leaving both nodes' links untouched.
    pub(crate) fn swap_entry(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.key, &mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    pub(crate) fn increment_size(&mut self) {
        self.size += 1;
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Link) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Link) {
        self.parent = parent;
    }

    /// Returns which side of its parent `this` hangs on, given the parent node.
    ///
    /// The root hangs on the sentinel's right.
    pub(crate) fn side_of(&self, this: Handle) -> Side {
        if self.left == Link::Node(this) { Side::Left } else { Side::Right }
    }

    /// Returns true if neither child is a real node.
    pub(crate) fn is_leaf(&self) -> bool {
        !self.left.is_real() && !self.right.is_real()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_a_leaf() {
        let node = Node::new(1, "a", Link::Sentinel);
        assert!(node.is_leaf());
        assert_eq!(node.height(), 0);
        assert_eq!(node.size(), 1);
        assert_eq!(node.parent(), Link::Sentinel);
    }

    #[test]
    fn links() {
        let handle = Handle::new(0, 0);
        assert!(Link::Node(handle).is_real());
        assert!(!Link::Empty.is_real());
        assert!(!Link::Sentinel.is_real());
        assert_eq!(Link::from(Some(handle)), Link::Node(handle));
        assert_eq!(Link::from(None), Link::Empty);
    }

    #[test]
    fn swap_entry_keeps_links() {
        let child = Handle::new(4, 0);
        let mut a = Node::new(1, "a", Link::Sentinel);
        let mut b = Node::new(2, "b", Link::Node(child));
        a.set_child(Side::Left, Link::Node(child));

        a.swap_entry(&mut b);

        assert_eq!((*a.key(), *a.value()), (2, "b"));
        assert_eq!((*b.key(), *b.value()), (1, "a"));
        assert_eq!(a.left(), Link::Node(child));
        assert_eq!(a.side_of(child), Side::Left);
        assert_eq!(b.parent(), Link::Node(child));
    }
}
