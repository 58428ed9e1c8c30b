use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use log::debug;

use crate::Error;
use crate::raw::{Handle, Link, RawAvlTree};

mod capacity;
mod finger;
mod node_ref;
mod order_statistic;
mod range_max;

pub use finger::FingerInsert;
pub use node_ref::{NodeId, NodeRef};

/// An ordered map based on an [AVL tree] with subtree sizes.
///
/// Given a key type with a [total order], the map stores its entries in key order and keeps
/// itself height-balanced after every insertion and deletion. Each node also records the size of
/// its subtree, which gives O(log n) order-statistic queries: [`rank`](AvlTreeMap::rank) and
/// [`select`](AvlTreeMap::select).
///
/// The map caches a pointer to its maximum. [`insert_from_max`](AvlTreeMap::insert_from_max)
/// starts its search there instead of at the root, which is cheap when keys arrive nearly sorted,
/// and reports how much work the insertion took and how many inversions it introduced.
///
/// Mutating operations return a *rebalance count*: the number of rotations performed plus the
/// number of ancestors whose height changed.
///
/// Nodes are addressed by [`NodeId`]. Rank and select are 1-based.
///
/// # Examples
///
/// ```
/// use finger_avl::AvlTreeMap;
///
/// let mut map = AvlTreeMap::new();
/// map.insert(10, "a");
/// map.insert(5, "b");
/// map.insert(1, "c");
///
/// // The third insertion rotated 5 up to the root.
/// assert_eq!(*map.root().unwrap().key(), 5);
///
/// let id = map.search(&10).unwrap();
/// assert_eq!(map.rank(id), Ok(3));
/// assert_eq!(*map.select(1).unwrap().value(), "c");
///
/// map.delete(id).unwrap();
/// assert_eq!(map.to_vec(), vec![(1, "c"), (5, "b")]);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct AvlTreeMap<K, V> {
    raw: RawAvlTree<K, V>,
}

/// An iterator over the entries of an `AvlTreeMap`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTreeMap`].
///
/// [`iter`]: AvlTreeMap::iter
pub struct Iter<'a, K, V> {
    raw: &'a RawAvlTree<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An iterator over the keys of an `AvlTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`AvlTreeMap`].
///
/// [`keys`]: AvlTreeMap::keys
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `AvlTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`AvlTreeMap`].
///
/// [`values`]: AvlTreeMap::values
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the entries of an `AvlTreeMap`, in key order.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> AvlTreeMap<K, V> {
        AvlTreeMap { raw: RawAvlTree::new() }
    }

    /// Clears the map, removing all elements. Every outstanding [`NodeId`] goes stale.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the root node, or `None` if the map is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.root().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// Returns a view of the node `id` refers to, or `None` if it is stale or belongs to another map.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, V>> {
        self.raw.owns(id.map, id.handle).then(|| NodeRef::new(&self.raw, id.handle))
    }

    fn id(&self, handle: Handle) -> NodeId {
        NodeId {
            handle,
            map: self.raw.tag(),
        }
    }

    fn live(&self, id: NodeId) -> Result<Handle, Error> {
        if self.raw.owns(id.map, id.handle) {
            Ok(id.handle)
        } else {
            debug!("rejected node id {id:?}: stale or issued by another map");
            Err(Error::StaleNode)
        }
    }

    /// Returns the node with the smallest key, or `None` if the map is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn minimum(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.minimum().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// Returns the node with the greatest key, or `None` if the map is empty.
    ///
    /// # Complexity
    ///
    /// O(1), from the cached maximum.
    #[must_use]
    pub fn maximum(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.max().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// Returns the node with the smallest key in the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` does not refer to a node in the map.
    pub fn subtree_minimum(&self, id: NodeId) -> Result<NodeRef<'_, K, V>, Error> {
        let handle = self.live(id)?;
        let min = self.raw.minimum_from(Link::Node(handle)).unwrap_or(handle);
        Ok(NodeRef::new(&self.raw, min))
    }

    /// Returns the node with the greatest key in the subtree rooted at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` does not refer to a node in the map.
    pub fn subtree_maximum(&self, id: NodeId) -> Result<NodeRef<'_, K, V>, Error> {
        let handle = self.live(id)?;
        let max = self.raw.maximum_from(Link::Node(handle)).unwrap_or(handle);
        Ok(NodeRef::new(&self.raw, max))
    }

    /// Returns the node following `id` in key order, or `None` if `id` is the maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` does not refer to a node in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(1, 'a'), (4, 'b'), (9, 'c')]);
    /// let id = map.search(&4).unwrap();
    ///
    /// assert_eq!(map.successor(id).unwrap().map(|n| *n.key()), Some(9));
    /// assert!(map.successor(map.maximum().unwrap().id()).unwrap().is_none());
    /// ```
    pub fn successor(&self, id: NodeId) -> Result<Option<NodeRef<'_, K, V>>, Error> {
        let handle = self.live(id)?;
        if self.raw.max() == Some(handle) {
            return Ok(None);
        }
        Ok(self.raw.successor_of(handle).map(|next| NodeRef::new(&self.raw, next)))
    }

    /// Returns the node preceding `id` in key order, or `None` if `id` is the minimum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` does not refer to a node in the map.
    pub fn predecessor(&self, id: NodeId) -> Result<Option<NodeRef<'_, K, V>>, Error> {
        let handle = self.live(id)?;
        Ok(self.raw.predecessor_of(handle).map(|prev| NodeRef::new(&self.raw, prev)))
    }

    /// Removes the node `id` refers to, returning the rebalance count.
    ///
    /// If the node has two children, it takes over its in-order successor's entry and the
    /// successor's node is removed instead: `id` stays valid and the successor's id goes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` does not refer to a node in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::{AvlTreeMap, Error};
    ///
    /// let mut map: AvlTreeMap<i32, ()> = (1..=7).map(|k| (k, ())).collect();
    /// let four = map.search(&4).unwrap();
    /// let five = map.search(&5).unwrap();
    ///
    /// map.delete(four).unwrap();
    /// assert_eq!(*map.node(four).unwrap().key(), 5);
    /// assert_eq!(map.delete(five), Err(Error::StaleNode));
    /// ```
    pub fn delete(&mut self, id: NodeId) -> Result<usize, Error> {
        let handle = self.live(id)?;
        let (_, _, rebalances) = self.raw.remove(handle);
        Ok(rebalances)
    }

    /// Returns the first key-value pair in the map.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.minimum().map(|node| (node.key(), node.value()))
    }

    /// Returns the last key-value pair in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.maximum().map(|node| (node.key(), node.value()))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            front: self.raw.minimum(),
            back: self.raw.max(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns every entry, ascending by key.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns the id of the node holding `key`, or `None` if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a");
    ///
    /// let id = map.search(&1).unwrap();
    /// assert_eq!(*map.node(id).unwrap().value(), "a");
    /// assert!(map.search(&2).is_none());
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.id(handle))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.node(handle).value())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key)?;
        Some(self.raw.node_mut(handle).value_mut())
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.raw.node(self.raw.search(key)?);
        Some((node.key(), node.value()))
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair, returning the rebalance count.
    ///
    /// If the key is already present its value is overwritten in place and 0 is returned; the key
    /// itself is not updated.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert(10, 'a'), 0);
    /// assert_eq!(map.insert(5, 'b'), 1);
    /// // A height change at 5 and one rotation at 10.
    /// assert_eq!(map.insert(1, 'c'), 2);
    ///
    /// assert_eq!(map.insert(1, 'd'), 0);
    /// assert_eq!(map[&1], 'd');
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> usize {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(key)?;
        let (key, value, _) = self.raw.remove(handle);
        Some((key, value))
    }
}

impl<K: Clone, V: Clone> Clone for AvlTreeMap<K, V> {
    fn clone(&self) -> Self {
        AvlTreeMap { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    fn eq(&self, other: &AvlTreeMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> AvlTreeMap<K, V> {
        AvlTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> AvlTreeMap<K, V> {
        let mut map = AvlTreeMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for AvlTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `AvlTreeMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.front = self.raw.successor_of(handle);
        self.remaining -= 1;

        let node = self.raw.node(handle);
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.back = self.raw.predecessor_of(handle);
        self.remaining -= 1;

        let node = self.raw.node(handle);
        Some((node.key(), node.value()))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}
