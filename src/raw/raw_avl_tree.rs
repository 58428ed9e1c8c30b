use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::sync::atomic::{self, AtomicU32};

use log::trace;

use super::arena::Arena;
use super::balance::Retrace;
use super::handle::Handle;
use super::node::{Link, Node, Side};

/// Source of per-tree tags. Wraps after `u32::MAX` trees have been created.
static NEXT_TAG: AtomicU32 = AtomicU32::new(0);

fn next_tag() -> u32 {
    NEXT_TAG.fetch_add(1, atomic::Ordering::Relaxed)
}

/// The AVL engine backing `AvlTreeMap`.
///
/// The sentinel above the root is not stored in the arena: its right child is `root`, its size
/// is `len`, and it appears in the structure only as the parent link of the root.
pub(crate) struct RawAvlTree<K, V> {
    /// Distinguishes this tree's handles from those of every other live tree.
    tag: u32,
    /// Arena storing all real nodes.
    pub(super) nodes: Arena<Node<K, V>>,
    /// The sentinel's right child.
    pub(super) root: Link,
    /// Total number of real nodes.
    pub(super) len: usize,
    /// The node holding the greatest key, or `Link::Sentinel` while the tree is empty.
    pub(super) max: Link,
}

// A clone is a different tree: handles issued by the original must not resolve in it.
impl<K: Clone, V: Clone> Clone for RawAvlTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            tag: next_tag(),
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            max: self.max,
        }
    }
}

impl<K, V> RawAvlTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) fn new() -> Self {
        Self {
            tag: next_tag(),
            nodes: Arena::new(),
            root: Link::Empty,
            len: 0,
            max: Link::Sentinel,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tag: next_tag(),
            nodes: Arena::with_capacity(capacity),
            root: Link::Empty,
            len: 0,
            max: Link::Sentinel,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns true if `handle` was issued by this tree under `tag` and its node is still live.
    pub(crate) fn owns(&self, tag: u32, handle: Handle) -> bool {
        self.tag == tag && self.contains(handle)
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Removes every node. All outstanding handles go stale.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = Link::Empty;
        self.len = 0;
        self.max = Link::Sentinel;
    }

    /// Returns the true root, if the tree is non-empty.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root.handle()
    }

    /// Returns the cached maximum, if the tree is non-empty.
    pub(crate) fn max(&self) -> Option<Handle> {
        self.max.handle()
    }

    /// Returns true if `handle` refers to a node currently in the tree.
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.nodes.contains(handle)
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Height of whatever occupies a slot. Empty slots are -1.
    #[inline]
    pub(crate) fn height(&self, link: Link) -> i32 {
        match link {
            Link::Node(handle) => self.nodes.get(handle).height(),
            Link::Empty | Link::Sentinel => -1,
        }
    }

    /// Size of whatever occupies a slot. The sentinel reports the whole tree.
    #[inline]
    pub(crate) fn size(&self, link: Link) -> usize {
        match link {
            Link::Node(handle) => self.nodes.get(handle).size(),
            Link::Empty => 0,
            Link::Sentinel => self.len,
        }
    }

    /// `height(left) - height(right)` for real nodes, 0 for everything else.
    pub(crate) fn balance_factor(&self, link: Link) -> i32 {
        match link {
            Link::Node(handle) => {
                let node = self.nodes.get(handle);
                self.height(node.left()) - self.height(node.right())
            }
            Link::Empty | Link::Sentinel => 0,
        }
    }

    pub(crate) fn is_unbalanced(&self, handle: Handle) -> bool {
        self.balance_factor(Link::Node(handle)).abs() > 1
    }

    fn leftmost(&self, mut current: Handle) -> Handle {
        while let Link::Node(left) = self.nodes.get(current).left() {
            current = left;
        }
        current
    }

    fn rightmost(&self, mut current: Handle) -> Handle {
        while let Link::Node(right) = self.nodes.get(current).right() {
            current = right;
        }
        current
    }

    /// Minimum of the subtree in `link`, or `None` if the slot is empty.
    pub(crate) fn minimum_from(&self, link: Link) -> Option<Handle> {
        link.handle().map(|handle| self.leftmost(handle))
    }

    /// Maximum of the subtree in `link`, or `None` if the slot is empty.
    pub(crate) fn maximum_from(&self, link: Link) -> Option<Handle> {
        link.handle().map(|handle| self.rightmost(handle))
    }

    pub(crate) fn minimum(&self) -> Option<Handle> {
        self.minimum_from(self.root)
    }

    /// Full descent to the maximum, ignoring the cache.
    pub(crate) fn maximum(&self) -> Option<Handle> {
        self.maximum_from(self.root)
    }

    /// In-order successor, or `None` for the maximum.
    pub(crate) fn successor_of(&self, handle: Handle) -> Option<Handle> {
        if let right @ Link::Node(_) = self.nodes.get(handle).right() {
            return self.minimum_from(right);
        }

        let mut current = handle;
        loop {
            match self.nodes.get(current).parent() {
                Link::Node(parent) => {
                    if self.nodes.get(parent).side_of(current) == Side::Left {
                        return Some(parent);
                    }
                    current = parent;
                }
                // Climbed off the top of the right spine.
                Link::Sentinel | Link::Empty => return None,
            }
        }
    }

    /// In-order predecessor, or `None` for the minimum.
    pub(crate) fn predecessor_of(&self, handle: Handle) -> Option<Handle> {
        if let left @ Link::Node(_) = self.nodes.get(handle).left() {
            return self.maximum_from(left);
        }

        let mut current = handle;
        loop {
            match self.nodes.get(current).parent() {
                Link::Node(parent) => {
                    if self.nodes.get(parent).side_of(current) == Side::Right {
                        return Some(parent);
                    }
                    current = parent;
                }
                Link::Sentinel | Link::Empty => return None,
            }
        }
    }

    /// 1-based position of `handle` in key order.
    pub(crate) fn rank(&self, handle: Handle) -> usize {
        let mut rank = self.size(self.nodes.get(handle).left());
        let mut current = handle;

        loop {
            match self.nodes.get(current).parent() {
                Link::Node(parent) => {
                    let parent_node = self.nodes.get(parent);
                    if parent_node.side_of(current) == Side::Right {
                        rank += self.size(parent_node.left()) + 1;
                    }
                    current = parent;
                }
                // The root is the sentinel's right child and the sentinel's left slot is empty.
                Link::Sentinel | Link::Empty => return rank + 1,
            }
        }
    }

    /// The node of 1-based rank `rank`, or `None` if `rank` is not in `1..=len`.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank == 0 || rank > self.len {
            return None;
        }

        let mut rank = rank;
        let mut current = self.root.handle()?;
        loop {
            let node = self.nodes.get(current);
            let here = self.size(node.left()) + 1;
            match rank.cmp(&here) {
                Ordering::Equal => return Some(current),
                Ordering::Less => current = node.left().handle()?,
                Ordering::Greater => {
                    rank -= here;
                    current = node.right().handle()?;
                }
            }
        }
    }

    /// Points `parent`'s slot that held `old` at `new`, and `new`'s parent link back at `parent`.
    pub(super) fn replace_child(&mut self, parent: Link, old: Handle, new: Link) {
        match parent {
            Link::Node(parent) => {
                let parent_node = self.nodes.get_mut(parent);
                let side = parent_node.side_of(old);
                parent_node.set_child(side, new);
            }
            Link::Sentinel | Link::Empty => self.root = new,
        }
        if let Link::Node(new) = new {
            self.nodes.get_mut(new).set_parent(parent);
        }
    }

    /// Allocates a leaf in `parent`'s `side` slot, or as the root when `parent` is the sentinel.
    pub(super) fn attach(&mut self, parent: Link, side: Side, key: K, value: V) -> Handle {
        let handle = self.nodes.alloc(Node::new(key, value, parent));
        match parent {
            Link::Node(parent) => self.nodes.get_mut(parent).set_child(side, Link::Node(handle)),
            Link::Sentinel | Link::Empty => self.root = Link::Node(handle),
        }
        handle
    }

    /// Removes `handle` from the tree, returning its entry and the rebalance count.
    ///
    /// A node with two children takes its successor's entry and the successor is unlinked instead,
    /// so `handle` stays live holding the successor's former entry.
    pub(crate) fn remove(&mut self, handle: Handle) -> (K, V, usize) {
        let (left, right, parent) = {
            let node = self.nodes.get(handle);
            (node.left(), node.right(), node.parent())
        };

        if let (Link::Node(_), Link::Node(right)) = (left, right) {
            let successor = self.leftmost(right);
            let (target, victim) = self.nodes.get2_mut(handle, successor);
            target.swap_entry(victim);
            return self.remove(successor);
        }

        let child = if left.is_real() { left } else { right };
        self.replace_child(parent, handle, child);
        let (key, value) = self.nodes.take(handle).into_entry();

        let rebalances = self.retrace(parent, Retrace::Remove);
        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);

        if self.max == Link::Node(handle) {
            self.max = self.maximum().map_or(Link::Sentinel, Link::Node);
            trace!("removed the maximum; recomputed cached maximum (empty: {})", self.max == Link::Sentinel);
        }

        (key, value, rebalances)
    }

    /// Handles in ascending key order.
    fn in_order(&self) -> Vec<Handle> {
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.minimum();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor_of(handle);
        }
        handles
    }

    /// Drains all entries in ascending key order. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let handles = self.in_order();
        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            result.push(self.nodes.take(handle).into_entry());
        }

        self.root = Link::Empty;
        self.len = 0;
        self.max = Link::Sentinel;
        result
    }
}

impl<K: Ord, V> RawAvlTree<K, V> {
    /// Descends from the root to the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Link::Node(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Inserts or overwrites `key`, returning the rebalance count (0 for an overwrite).
    pub(crate) fn insert(&mut self, key: K, value: V) -> usize {
        let mut parent = Link::Sentinel;
        let mut side = Side::Right;
        let mut current = self.root;

        while let Link::Node(handle) = current {
            let node = self.nodes.get_mut(handle);
            side = match key.cmp(node.key()) {
                Ordering::Equal => {
                    node.replace_value(value);
                    return 0;
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = current;
            current = node.child(side);
        }

        let handle = self.attach(parent, side, key, value);
        self.finish_insert(handle, parent)
    }

    /// Runs the insertion ascent from `parent` and updates the sentinel size and cached maximum.
    pub(super) fn finish_insert(&mut self, handle: Handle, parent: Link) -> usize {
        let rebalances = self.retrace(parent, Retrace::Insert);
        self.len += 1;
        debug_assert_eq!(self.nodes.len(), self.len);

        let is_new_max = match self.max {
            Link::Node(max) => self.nodes.get(handle).key() > self.nodes.get(max).key(),
            Link::Sentinel | Link::Empty => true,
        };
        if is_new_max {
            self.max = Link::Node(handle);
        }

        rebalances
    }

    /// First node whose key is `>= key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut last = None;

        while let Link::Node(handle) = current {
            let node = self.nodes.get(handle);
            last = Some(handle);
            current = match node.key().borrow().cmp(key) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.right(),
                Ordering::Greater => node.left(),
            };
        }

        // The descent ends next to `key`: on its in-order neighbour from one side or the other.
        let last = last?;
        if self.nodes.get(last).key().borrow() < key {
            self.successor_of(last)
        } else {
            Some(last)
        }
    }

    /// Node with the greatest value among keys in `low..=high`; the smallest such key wins ties.
    ///
    /// Walks the range one successor at a time.
    pub(crate) fn max_range<Q>(&self, low: &Q, high: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        V: PartialOrd,
    {
        let mut best: Option<Handle> = None;
        let mut current = self.lower_bound(low);

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if node.key().borrow() > high {
                break;
            }
            if best.is_none_or(|best| node.value() > self.nodes.get(best).value()) {
                best = Some(handle);
            }
            current = self.successor_of(handle);
        }

        best
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::uninlined_format_args, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl<K: Ord + Clone + core::fmt::Debug, V> RawAvlTree<K, V> {
        /// Validates all AVL invariants. Panics with a descriptive message if any are violated.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            if let Link::Node(root) = self.root {
                if self.nodes.get(root).parent() != Link::Sentinel {
                    errors.push(String::from("root's parent link is not the sentinel"));
                }
            }

            let (count, _) = self.validate_node(self.root, None, None, &mut errors);

            if count != self.len {
                errors.push(alloc::format!("len mismatch: self.len={}, actual count={}", self.len, count));
            }
            if self.nodes.len() != self.len {
                errors.push(alloc::format!("arena holds {} nodes, len is {}", self.nodes.len(), self.len));
            }

            let scanned = self.maximum();
            if self.max.handle() != scanned {
                errors.push(alloc::format!("cached maximum {:?} != scanned maximum {:?}", self.max, scanned));
            }
            if self.is_empty() && self.max != Link::Sentinel {
                errors.push(String::from("empty tree must cache the sentinel as its maximum"));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns (size, height) of the subtree in `link`.
        fn validate_node(&self, link: Link, low: Option<&K>, high: Option<&K>, errors: &mut Vec<String>) -> (usize, i32) {
            let Link::Node(handle) = link else {
                return (0, -1);
            };
            let node = self.nodes.get(handle);
            let key = node.key();

            if low.is_some_and(|low| key <= low) || high.is_some_and(|high| key >= high) {
                errors.push(alloc::format!("key {:?} violates search order", key));
            }

            for child in [node.left(), node.right()] {
                if let Link::Node(child) = child {
                    if self.nodes.get(child).parent() != link {
                        errors.push(alloc::format!("child of {:?} has a wrong parent link", key));
                    }
                }
            }

            let (left_size, left_height) = self.validate_node(node.left(), low, Some(key), errors);
            let (right_size, right_height) = self.validate_node(node.right(), Some(key), high, errors);
            let size = left_size + right_size + 1;
            let height = 1 + left_height.max(right_height);

            if node.size() != size {
                errors.push(alloc::format!("size of {:?} is {}, expected {}", key, node.size(), size));
            }
            if node.height() != height {
                errors.push(alloc::format!("height of {:?} is {}, expected {}", key, node.height(), height));
            }
            if (left_height - right_height).abs() > 1 {
                errors.push(alloc::format!("{:?} is unbalanced: {} vs {}", key, left_height, right_height));
            }

            (size, height)
        }

        pub(crate) fn keys_in_order(&self) -> Vec<K> {
            self.in_order().into_iter().map(|handle| self.nodes.get(handle).key().clone()).collect()
        }
    }

    pub(crate) fn tree_from(keys: impl IntoIterator<Item = i32>) -> RawAvlTree<i32, i32> {
        let mut tree = RawAvlTree::new();
        for key in keys {
            tree.insert(key, key * 2);
        }
        tree
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawAvlTree<i32, i32> = RawAvlTree::new();
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key, key * 2);
                        model.insert(key, key * 2);
                    }
                    Op::Remove(key) => {
                        let removed = tree.search(&key).map(|handle| {
                            let (k, v, _) = tree.remove(handle);
                            (k, v)
                        });
                        prop_assert_eq!(removed, model.remove_entry(&key));
                    }
                }
                tree.validate_invariants();
            }

            let expected: Vec<i32> = model.keys().copied().collect();
            prop_assert_eq!(tree.keys_in_order(), expected);
        }

        #[test]
        fn rank_select_roundtrip(keys in prop::collection::vec(0i32..500, 1..200)) {
            let tree = tree_from(keys.iter().copied());
            tree.validate_invariants();

            let mut expected = keys.clone();
            expected.sort_unstable();
            expected.dedup();

            for (index, &key) in expected.iter().enumerate() {
                let handle = tree.select(index + 1).expect("select within bounds");
                prop_assert_eq!(*tree.node(handle).key(), key);
                prop_assert_eq!(tree.rank(handle), index + 1);
            }
            prop_assert!(tree.select(0).is_none());
            prop_assert!(tree.select(expected.len() + 1).is_none());
        }

        #[test]
        fn successor_walk_matches_sorted_order(keys in prop::collection::vec(-300i32..300, 0..200)) {
            let tree = tree_from(keys.iter().copied());
            let mut expected = keys.clone();
            expected.sort_unstable();
            expected.dedup();

            let mut forward = Vec::new();
            let mut current = tree.minimum();
            while let Some(handle) = current {
                forward.push(*tree.node(handle).key());
                current = tree.successor_of(handle);
            }
            prop_assert_eq!(&forward, &expected);

            let mut backward = Vec::new();
            let mut current = tree.maximum();
            while let Some(handle) = current {
                backward.push(*tree.node(handle).key());
                current = tree.predecessor_of(handle);
            }
            backward.reverse();
            prop_assert_eq!(&backward, &expected);
        }

        #[test]
        fn max_range_matches_linear_scan(
            entries in prop::collection::vec((0i32..200, 0i32..50), 0..150),
            low in 0i32..200,
            span in 1i32..100,
        ) {
            let mut tree: RawAvlTree<i32, i32> = RawAvlTree::new();
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();
            for (key, value) in entries {
                tree.insert(key, value);
                model.insert(key, value);
            }
            let high = low + span;

            // Strict comparison keeps the smallest key among equal maxima.
            let mut expected: Option<(i32, i32)> = None;
            for (&key, &value) in model.range(low..=high) {
                if expected.is_none_or(|(_, best)| value > best) {
                    expected = Some((key, value));
                }
            }

            let actual = tree.max_range(&low, &high).map(|handle| {
                let node = tree.node(handle);
                (*node.key(), *node.value())
            });
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn empty_tree() {
        let tree: RawAvlTree<i32, i32> = RawAvlTree::new();
        tree.validate_invariants();

        assert!(tree.root().is_none());
        assert!(tree.max().is_none());
        assert_eq!(tree.size(Link::Sentinel), 0);
        assert!(tree.search(&7).is_none());
        assert!(tree.minimum().is_none());
        assert!(tree.select(1).is_none());
        assert!(tree.max_range(&0, &10).is_none());
        assert!(tree.lower_bound(&0).is_none());
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut tree = tree_from([5, 3, 8]);
        assert_eq!(tree.insert(3, 99), 0);
        tree.validate_invariants();

        assert_eq!(tree.len(), 3);
        let handle = tree.search(&3).expect("key 3 is present");
        assert_eq!(*tree.node(handle).value(), 99);
    }

    #[test]
    fn ascending_keys_select_and_rank() {
        let tree = tree_from(1..=10);
        tree.validate_invariants();

        for i in 1..=10 {
            let handle = tree.select(i).expect("rank in bounds");
            assert_eq!(*tree.node(handle).key(), i as i32);
            assert_eq!(tree.rank(handle), i);
        }
    }

    #[test]
    fn removing_node_with_two_children_moves_successor_entry() {
        let mut tree = tree_from(1..=7);
        tree.validate_invariants();

        let four = tree.search(&4).expect("key 4 is present");
        let five = tree.search(&5).expect("key 5 is present");
        assert_eq!(tree.root(), Some(four));

        let (key, value, _) = tree.remove(four);
        tree.validate_invariants();

        assert_eq!((key, value), (4, 8));
        assert!(tree.contains(four));
        assert!(!tree.contains(five));
        assert_eq!(*tree.node(four).key(), 5);
        assert_eq!(*tree.node(four).value(), 10);
        assert_eq!(tree.keys_in_order(), vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn cached_maximum_follows_removals() {
        let mut tree = tree_from([4, 2, 6, 1, 3, 5, 7]);
        for expected in (1..=7).rev() {
            let max = tree.max().expect("non-empty");
            assert_eq!(*tree.node(max).key(), expected);
            tree.remove(max);
            tree.validate_invariants();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.max, Link::Sentinel);
        assert_eq!(tree.root, Link::Empty);
    }

    #[test]
    fn lower_bound_between_keys() {
        let tree = tree_from([10, 20, 30, 40]);
        let key_of = |handle: Option<Handle>| handle.map(|handle| *tree.node(handle).key());

        assert_eq!(key_of(tree.lower_bound(&5)), Some(10));
        assert_eq!(key_of(tree.lower_bound(&20)), Some(20));
        assert_eq!(key_of(tree.lower_bound(&21)), Some(30));
        assert_eq!(key_of(tree.lower_bound(&41)), None);
    }

    #[test]
    fn max_range_scenarios() {
        let mut tree: RawAvlTree<i32, i32> = RawAvlTree::new();
        for (key, value) in [(1, 5), (2, 1), (3, 9), (4, 2)] {
            tree.insert(key, value);
        }

        let best = tree.max_range(&1, &4).expect("keys in range");
        assert_eq!((*tree.node(best).key(), *tree.node(best).value()), (3, 9));

        let best = tree.max_range(&4, &10).expect("key 4 in range");
        assert_eq!(*tree.node(best).key(), 4);

        assert!(tree.max_range(&5, &10).is_none());
        assert!(tree.max_range(&-10, &0).is_none());
    }

    #[test]
    fn drain_to_vec_empties_tree() {
        let mut tree = tree_from([3, 1, 2]);
        let root = tree.root().expect("non-empty");
        assert_eq!(tree.drain_to_vec(), vec![(1, 2), (2, 4), (3, 6)]);

        tree.validate_invariants();
        assert!(!tree.contains(root));
        assert_eq!(tree.insert(9, 9), 0);
        tree.validate_invariants();
    }

    #[test]
    fn trees_are_tagged_apart() {
        let tree = tree_from(1..=4);
        let other = tree_from(1..=4);
        let copy = tree.clone();
        let handle = tree.search(&1).expect("present");

        assert!(tree.owns(tree.tag(), handle));
        assert_ne!(tree.tag(), other.tag());
        assert_ne!(tree.tag(), copy.tag());
        // Same slot and generation in every tree; only the tag tells them apart.
        assert!(other.contains(handle) && copy.contains(handle));
        assert!(!other.owns(tree.tag(), handle));
        assert!(!copy.owns(tree.tag(), handle));
        copy.validate_invariants();
    }

    #[test]
    fn clear_resets_sentinel() {
        let mut tree = tree_from(0..32);
        let handle = tree.search(&16).expect("present");
        tree.clear();
        tree.validate_invariants();

        assert!(!tree.contains(handle));
        assert_eq!(tree.size(Link::Sentinel), 0);
    }
}
