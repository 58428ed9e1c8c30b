use log::debug;

use super::AvlTreeMap;
use crate::Error;

/// What a call to [`insert_from_max`](AvlTreeMap::insert_from_max) cost.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FingerInsert {
    /// Rebalances performed plus nodes visited while locating the insertion point.
    pub sort_cost: usize,
    /// Number of keys already in the map that are greater than the inserted key.
    pub substitutions: usize,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Inserts an absent key, searching from the maximum rather than the root.
    ///
    /// The search first climbs from the maximum while the parent's key is still greater than
    /// `key`, then descends from there. For keys that arrive in nearly ascending order this stays
    /// close to the right edge of the tree. Summing [`FingerInsert::substitutions`] over a sequence
    /// of insertions counts its inversions, and summing [`FingerInsert::sort_cost`] gives the work
    /// an adaptive insertion sort would do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`], leaving the map unchanged, if `key` is already present.
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
    /// let mut map = AvlTreeMap::new();
    /// let mut inversions = 0;
    /// for key in [1, 2, 4, 3, 5] {
    ///     inversions += map.insert_from_max(key, ()).unwrap().substitutions;
    /// }
    /// assert_eq!(inversions, 1);
    ///
    /// assert_eq!(map.insert_from_max(3, ()), Err(Error::DuplicateKey));
    /// assert_eq!(map.insert_from_max(0, ()).map(|f| f.substitutions), Ok(5));
    /// ```
    pub fn insert_from_max(&mut self, key: K, value: V) -> Result<FingerInsert, Error> {
        match self.raw.insert_from_max(key, value) {
            Some((sort_cost, substitutions)) => Ok(FingerInsert { sort_cost, substitutions }),
            None => {
                debug!("rejected duplicate key for insert_from_max");
                Err(Error::DuplicateKey)
            }
        }
    }
}
