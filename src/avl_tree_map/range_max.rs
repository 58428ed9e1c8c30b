use core::borrow::Borrow;

use log::debug;

use super::{AvlTreeMap, NodeRef};
use crate::Error;

impl<K: Ord, V: PartialOrd> AvlTreeMap<K, V> {
    /// Returns the node holding the greatest value among keys in `low..=high`.
    ///
    /// When several keys share the greatest value the smallest of them wins. Returns `Ok(None)`
    /// if no key falls in the range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] unless `low < high`.
    ///
    /// # Complexity
    ///
    /// O(log n + m), where m is the number of keys in the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use finger_avl::{AvlTreeMap, Error};
    ///
    /// let map = AvlTreeMap::from([(1, 5), (3, 9), (5, 2), (7, 9)]);
    ///
    /// assert_eq!(map.max_range(&2, &8).unwrap().map(|n| *n.key()), Some(3));
    /// assert_eq!(map.max_range(&4, &6).unwrap().map(|n| *n.value()), Some(2));
    /// assert!(map.max_range(&8, &9).unwrap().is_none());
    /// assert_eq!(map.max_range(&5, &5).unwrap_err(), Error::InvalidRange);
    /// ```
    pub fn max_range<Q>(&self, low: &Q, high: &Q) -> Result<Option<NodeRef<'_, K, V>>, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if low >= high {
            debug!("rejected empty or inverted range for max_range");
            return Err(Error::InvalidRange);
        }
        Ok(self.raw.max_range(low, high).map(|handle| NodeRef::new(&self.raw, handle)))
    }
}
