use core::fmt;

use crate::raw::{Handle, Node, RawAvlTree};

/// A stable handle to a node of an [`AvlTreeMap`](crate::AvlTreeMap).
///
/// Returned by lookups such as [`search`](crate::AvlTreeMap::search) and
/// [`select`](crate::AvlTreeMap::select), and accepted by operations that act on a specific node
/// such as [`delete`](crate::AvlTreeMap::delete) and [`rank`](crate::AvlTreeMap::rank).
///
/// A `NodeId` goes stale once its node is physically removed. Operations given a stale id return
/// [`Error::StaleNode`](crate::Error::StaleNode), even if the node's storage has since been reused.
/// An id issued by another map, including a clone of the issuing map, is rejected the same way.
///
/// Staleness is tracked by a 32-bit generation per storage slot. A slot whose generation is
/// exhausted is retired rather than reused, so a stale id never becomes valid again.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeId {
    pub(crate) handle: Handle,
    pub(crate) map: u32,
}

/// A read-only view of one node in an [`AvlTreeMap`](crate::AvlTreeMap).
///
/// Exposes the node's entry, its bookkeeping fields, and links to its neighbours so the tree's
/// shape can be walked from [`root`](crate::AvlTreeMap::root).
///
/// # Examples
///
/// ```
/// use finger_avl::AvlTreeMap;
///
/// let map = AvlTreeMap::from([(2, "b"), (1, "a"), (3, "c")]);
/// let root = map.root().unwrap();
///
/// assert_eq!(*root.key(), 2);
/// assert_eq!(root.height(), 1);
/// assert_eq!(root.size(), 3);
/// assert_eq!(root.left().map(|n| *n.key()), Some(1));
/// assert!(root.parent().is_none());
/// ```
pub struct NodeRef<'a, K, V> {
    raw: &'a RawAvlTree<K, V>,
    handle: Handle,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(raw: &'a RawAvlTree<K, V>, handle: Handle) -> Self {
        Self { raw, handle }
    }

    fn node(&self) -> &'a Node<K, V> {
        self.raw.node(self.handle)
    }

    fn link(&self, handle: Option<Handle>) -> Option<NodeRef<'a, K, V>> {
        handle.map(|handle| NodeRef::new(self.raw, handle))
    }

    /// Returns the id of this node, valid for the map that produced this view.
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId {
            handle: self.handle,
            map: self.raw.tag(),
        }
    }

    /// Returns the node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.node().key()
    }

    /// Returns the value stored with the key.
    #[must_use]
    pub fn value(&self) -> &'a V {
        self.node().value()
    }

    /// Returns the node's height. A node with no children has height 0.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.node().height()
    }

    /// Returns the number of nodes in the subtree rooted here, including this one.
    #[must_use]
    pub fn size(&self) -> usize {
        self.node().size()
    }

    /// Returns `height(left) - height(right)`, with absent children counting as height -1.
    #[must_use]
    pub fn balance_factor(&self) -> i32 {
        self.raw.balance_factor(crate::raw::Link::Node(self.handle))
    }

    /// Returns true if the balance factor's magnitude exceeds 1.
    ///
    /// Never true for a node observed between public operations.
    #[must_use]
    pub fn is_unbalanced(&self) -> bool {
        self.raw.is_unbalanced(self.handle)
    }

    /// Returns true if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Returns the left child, whose subtree holds the smaller keys.
    #[must_use]
    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node().left().handle())
    }

    /// Returns the right child, whose subtree holds the greater keys.
    #[must_use]
    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node().right().handle())
    }

    /// Returns the parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.node().parent().handle())
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.raw, other.raw) && self.handle == other.handle
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .field("size", &self.size())
            .finish()
    }
}
