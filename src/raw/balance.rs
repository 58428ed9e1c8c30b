use log::trace;

use super::handle::Handle;
use super::node::{Link, Side};
use super::raw_avl_tree::RawAvlTree;

/// Which mutation a retrace follows. Sizes are incremented after an insert and recomputed after a
/// removal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Retrace {
    Insert,
    Remove,
}

impl<K, V> RawAvlTree<K, V> {
    /// Recomputes the height of `handle` from its children, returning the new height.
    fn update_height(&mut self, handle: Handle) -> i32 {
        let node = self.nodes.get(handle);
        let height = 1 + self.height(node.left()).max(self.height(node.right()));
        self.nodes.get_mut(handle).set_height(height);
        height
    }

    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = self.size(node.left()) + self.size(node.right()) + 1;
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Relinks `a`'s right child `b` into `a`'s place, with `a` becoming `b`'s left child.
    pub(super) fn rotate_left(&mut self, a: Handle) {
        let Link::Node(b) = self.nodes.get(a).right() else {
            unreachable!("`RawAvlTree::rotate_left()` - right child is not a real node");
        };
        let parent = self.nodes.get(a).parent();
        self.replace_child(parent, a, Link::Node(b));

        let inner = self.nodes.get(b).left();
        self.nodes.get_mut(a).set_child(Side::Right, inner);
        if let Link::Node(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Link::Node(a));
        }

        self.nodes.get_mut(b).set_child(Side::Left, Link::Node(a));
        self.nodes.get_mut(a).set_parent(Link::Node(b));

        // `a` is now the child, so it goes first.
        self.update_height(a);
        self.update_size(a);
        self.update_height(b);
        self.update_size(b);
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    pub(super) fn rotate_right(&mut self, a: Handle) {
        let Link::Node(b) = self.nodes.get(a).left() else {
            unreachable!("`RawAvlTree::rotate_right()` - left child is not a real node");
        };
        let parent = self.nodes.get(a).parent();
        self.replace_child(parent, a, Link::Node(b));

        let inner = self.nodes.get(b).right();
        self.nodes.get_mut(a).set_child(Side::Left, inner);
        if let Link::Node(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Link::Node(a));
        }

        self.nodes.get_mut(b).set_child(Side::Right, Link::Node(a));
        self.nodes.get_mut(a).set_parent(Link::Node(b));

        self.update_height(a);
        self.update_size(a);
        self.update_height(b);
        self.update_size(b);
    }

    pub(super) fn rotate_left_right(&mut self, a: Handle) {
        let Link::Node(left) = self.nodes.get(a).left() else {
            unreachable!("`RawAvlTree::rotate_left_right()` - left child is not a real node");
        };
        self.rotate_left(left);
        self.rotate_right(a);
    }

    pub(super) fn rotate_right_left(&mut self, a: Handle) {
        let Link::Node(right) = self.nodes.get(a).right() else {
            unreachable!("`RawAvlTree::rotate_right_left()` - right child is not a real node");
        };
        self.rotate_right(right);
        self.rotate_left(a);
    }

    /// Restores balance at a node whose balance factor is +-2. Returns the number of rotations.
    pub(super) fn rebalance(&mut self, a: Handle) -> usize {
        let node = self.nodes.get(a);
        match self.balance_factor(Link::Node(a)) {
            -2 => match self.balance_factor(node.right()) {
                0 | -1 => {
                    trace!("rebalance: left rotation");
                    self.rotate_left(a);
                    1
                }
                1 => {
                    trace!("rebalance: right-left rotation");
                    self.rotate_right_left(a);
                    2
                }
                bf => unreachable!("`RawAvlTree::rebalance()` - right child balance factor {bf}"),
            },
            2 => match self.balance_factor(node.left()) {
                0 | 1 => {
                    trace!("rebalance: right rotation");
                    self.rotate_right(a);
                    1
                }
                -1 => {
                    trace!("rebalance: left-right rotation");
                    self.rotate_left_right(a);
                    2
                }
                bf => unreachable!("`RawAvlTree::rebalance()` - left child balance factor {bf}"),
            },
            bf => unreachable!("`RawAvlTree::rebalance()` - balance factor {bf}"),
        }
    }

    /// Walks from `start` up to the sentinel, fixing heights and sizes and rotating unbalanced nodes.
    ///
    /// Returns rotations applied plus the number of balanced ancestors whose height changed. The
    /// walk never stops early: every ancestor's size must be updated.
    pub(super) fn retrace(&mut self, start: Link, mode: Retrace) -> usize {
        let mut rebalances = 0;
        let mut current = start;

        while let Link::Node(handle) = current {
            let next = self.nodes.get(handle).parent();

            if mode == Retrace::Remove {
                self.update_size(handle);
            }
            let old_height = self.nodes.get(handle).height();
            let new_height = self.update_height(handle);

            if self.is_unbalanced(handle) {
                // Rotations size the nodes they move.
                rebalances += self.rebalance(handle);
            } else {
                if mode == Retrace::Insert {
                    self.nodes.get_mut(handle).increment_size();
                }
                if new_height != old_height {
                    rebalances += 1;
                }
            }

            current = next;
        }

        rebalances
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::raw_avl_tree::tests::tree_from;
    use super::*;
    use alloc::vec;

    fn key_at(tree: &RawAvlTree<i32, i32>, link: Link) -> Option<i32> {
        link.handle().map(|handle| *tree.node(handle).key())
    }

    fn shape(tree: &RawAvlTree<i32, i32>) -> (Option<i32>, Option<i32>, Option<i32>) {
        let root = tree.root().expect("non-empty");
        let node = tree.node(root);
        (Some(*node.key()), key_at(tree, node.left()), key_at(tree, node.right()))
    }

    #[test]
    fn left_left_case_rotates_once() {
        let mut tree = RawAvlTree::new();
        assert_eq!(tree.insert(10, 'a'), 0);
        assert_eq!(tree.insert(5, 'b'), 1);
        // One height change at 5, then a single right rotation at 10.
        assert_eq!(tree.insert(1, 'c'), 2);

        let root = tree.root().expect("non-empty");
        let node = tree.node(root);
        assert_eq!(*node.key(), 5);
        assert_eq!(node.left().handle().map(|h| *tree.node(h).key()), Some(1));
        assert_eq!(node.right().handle().map(|h| *tree.node(h).key()), Some(10));
        assert_eq!(tree.height(Link::Node(root)), 1);
        assert_eq!(tree.size(Link::Node(root)), 3);
    }

    #[test]
    fn left_right_case_rotates_twice() {
        let mut tree = tree_from([10, 5]);
        // Height change at 5, then a double rotation at 10.
        assert_eq!(tree.insert(7, 14), 3);
        tree.validate_invariants();
        assert_eq!(shape(&tree), (Some(7), Some(5), Some(10)));
    }

    #[test]
    fn right_left_case_rotates_twice() {
        let mut tree = tree_from([10, 15]);
        assert_eq!(tree.insert(12, 24), 3);
        tree.validate_invariants();
        assert_eq!(shape(&tree), (Some(12), Some(10), Some(15)));
    }

    #[test]
    fn right_right_case_rotates_once() {
        let mut tree = tree_from([1, 2]);
        assert_eq!(tree.insert(3, 6), 2);
        tree.validate_invariants();
        assert_eq!(shape(&tree), (Some(2), Some(1), Some(3)));
    }

    #[test]
    fn rotation_relinks_parent() {
        let mut tree = tree_from([2, 1, 3]);
        let three = tree.search(&3).expect("present");
        tree.insert(4, 8);
        tree.insert(5, 10);
        tree.validate_invariants();
        // 3 rotated down under 4 when 5 arrived.
        assert_eq!(tree.node(three).parent(), tree.search(&4).map(Link::Node).expect("present"));
    }

    #[test]
    fn balance_factor_of_sentinels_is_zero() {
        let tree = tree_from([1, 2, 3]);
        assert_eq!(tree.balance_factor(Link::Empty), 0);
        assert_eq!(tree.balance_factor(Link::Sentinel), 0);
        assert_eq!(tree.height(Link::Empty), -1);
        assert_eq!(tree.size(Link::Empty), 0);
        assert_eq!(tree.size(Link::Sentinel), 3);
    }

    #[test]
    fn removal_retraces_every_ancestor() {
        let mut tree = tree_from(1..=12);
        tree.validate_invariants();

        // Removing leaves from the left flank shrinks sizes all the way up and forces rotations.
        for key in [1, 3, 2] {
            let handle = tree.search(&key).expect("present");
            tree.remove(handle);
            tree.validate_invariants();
        }
        assert_eq!(tree.keys_in_order(), vec![4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(tree.size(Link::Sentinel), 9);
    }

    fn remove_key(tree: &mut RawAvlTree<i32, i32>, key: i32) -> usize {
        let handle = tree.search(&key).expect("present");
        let (removed, _, rebalances) = tree.remove(handle);
        assert_eq!(removed, key);
        tree.validate_invariants();
        rebalances
    }

    #[test]
    fn removal_with_double_rotation() {
        // 2(1, 4(3, _)): removing 1 leaves 2 at -2 with a left-heavy right child.
        let mut tree = tree_from([2, 1, 4, 3]);
        assert_eq!(remove_key(&mut tree, 1), 2);
        assert_eq!(shape(&tree), (Some(3), Some(2), Some(4)));
        assert_eq!(tree.height(tree.root), 1);
    }

    #[test]
    fn removal_with_balanced_sibling_rotates_once() {
        // 2(1, 4(3, 5)): the sibling 4 is balanced, so a single left rotation suffices and the
        // subtree keeps its height.
        let mut tree = tree_from([2, 1, 4, 3, 5]);
        assert_eq!(remove_key(&mut tree, 1), 1);
        assert_eq!(shape(&tree), (Some(4), Some(2), Some(5)));

        let two = tree.search(&2).expect("present");
        assert_eq!(key_at(&tree, tree.node(two).right()), Some(3));
        assert_eq!(tree.height(tree.root), 2);
    }

    #[test]
    fn removal_shrinks_every_left_heavy_ancestor() {
        // 8(4(2(1, _), 6), 10(9, _)): every node on the path to 1 leans left by one.
        let mut tree = tree_from([8, 4, 10, 2, 6, 9, 1]);
        assert_eq!(tree.height(tree.root), 3);

        // Heights drop at 2, 4 and 8, with no rotation.
        assert_eq!(remove_key(&mut tree, 1), 3);
        assert_eq!(shape(&tree), (Some(8), Some(4), Some(10)));
        assert_eq!(tree.height(tree.root), 2);
    }

    #[test]
    fn removal_without_height_change_counts_nothing() {
        // The successor 5 is unlinked from under 6, which keeps 7 and its height.
        let mut tree = tree_from(1..=7);
        assert_eq!(remove_key(&mut tree, 4), 0);
        assert_eq!(shape(&tree), (Some(5), Some(2), Some(6)));
    }

    #[test]
    fn removal_with_rotation_counts_rotations() {
        // 2(1, 3(_, 4)): removing 1 makes 2 right-heavy by two.
        let mut tree = tree_from([2, 1, 3, 4]);
        let one = tree.search(&1).expect("present");
        // The parent's height is unchanged at the removal point, then one left rotation.
        assert_eq!(tree.remove(one).2, 1);
        tree.validate_invariants();
        assert_eq!(shape(&tree), (Some(3), Some(2), Some(4)));
    }
}
