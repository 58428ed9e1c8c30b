use core::borrow::Borrow;

use log::debug;

use super::{AvlTreeMap, NodeId, NodeRef};
use crate::Error;

impl<K, V> AvlTreeMap<K, V> {
    /// Returns the 1-based position of node `id` in key order.
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
    /// let map: AvlTreeMap<i32, ()> = (1..=10).map(|k| (k, ())).collect();
    /// let id = map.search(&7).unwrap();
    /// assert_eq!(map.rank(id), Ok(7));
    /// ```
    pub fn rank(&self, id: NodeId) -> Result<usize, Error> {
        let handle = self.live(id)?;
        Ok(self.raw.rank(handle))
    }

    /// Returns the node of 1-based rank `rank`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RankOutOfBounds`] unless `1 <= rank <= len`.
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
    /// let map = AvlTreeMap::from([("a", 10), ("c", 30), ("b", 20)]);
    ///
    /// assert_eq!(*map.select(2).unwrap().key(), "b");
    /// assert_eq!(map.select(0).unwrap_err(), Error::RankOutOfBounds { rank: 0, len: 3 });
    /// assert!(map.select(4).is_err());
    /// ```
    pub fn select(&self, rank: usize) -> Result<NodeRef<'_, K, V>, Error> {
        match self.raw.select(rank) {
            Some(handle) => Ok(NodeRef::new(&self.raw, handle)),
            None => {
                debug!("rejected rank {rank} for a map of {} entries", self.len());
                Err(Error::RankOutOfBounds { rank, len: self.len() })
            }
        }
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns the 1-based position of `key` in key order, or `None` if it is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.rank(handle))
    }
}
