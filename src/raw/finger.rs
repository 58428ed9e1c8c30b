use core::cmp::Ordering;

use super::node::{Link, Side};
use super::raw_avl_tree::RawAvlTree;

impl<K: Ord, V> RawAvlTree<K, V> {
    /// Inserts an absent `key` by searching from the cached maximum instead of the root.
    ///
    /// Returns `(sort_cost, substitutions)`: rebalances plus nodes visited, and the number of keys
    /// already present that are greater than `key`. Returns `None`, leaving the tree untouched, if
    /// `key` is already present.
    pub(crate) fn insert_from_max(&mut self, key: K, value: V) -> Option<(usize, usize)> {
        let Link::Node(max) = self.max else {
            return Some((self.insert(key, value), 0));
        };

        let mut visited = 0;
        let mut finger = max;

        // Climb the right spine while the parent still sorts after `key`. The subtree left at
        // `finger` then holds every key greater than `key`.
        while let Link::Node(parent) = self.nodes.get(finger).parent() {
            match self.nodes.get(parent).key().cmp(&key) {
                Ordering::Greater => {
                    visited += 1;
                    finger = parent;
                }
                Ordering::Equal => return None,
                Ordering::Less => break,
            }
        }

        let mut rank = self.len + 1;
        let mut parent = Link::Node(finger);
        let mut side = Side::Right;
        let mut current = Link::Node(finger);

        while let Link::Node(handle) = current {
            let node = self.nodes.get(handle);
            side = match key.cmp(node.key()) {
                Ordering::Equal => return None,
                Ordering::Less => {
                    rank -= self.size(node.right()) + 1;
                    Side::Left
                }
                Ordering::Greater => Side::Right,
            };
            parent = current;
            current = node.child(side);
            visited += 1;
        }

        let handle = self.attach(parent, side, key, value);
        let rebalances = self.finish_insert(handle, parent);

        Some((rebalances + visited, self.len - rank))
    }
}
