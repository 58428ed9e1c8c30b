use super::AvlTreeMap;
use crate::raw::RawAvlTree;

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` nodes before reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, i32> = AvlTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlTreeMap {
            raw: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes the map can hold without reallocating.
    ///
    /// Removed nodes leave their storage behind for reuse, so this never shrinks.
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<i32, i32> = AvlTreeMap::with_capacity(32);
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
