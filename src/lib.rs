//! An order-statistic AVL tree map with finger insertion from the maximum.
//!
//! [`AvlTreeMap`] is a height-balanced binary search tree whose nodes also record their subtree
//! sizes, giving O(log n) order-statistic queries alongside the usual map operations:
//!
//! - [`rank`](AvlTreeMap::rank) and [`select`](AvlTreeMap::select) - 1-based sorted positions
//! - [`max_range`](AvlTreeMap::max_range) - the entry with the greatest value in a key range
//! - [`insert_from_max`](AvlTreeMap::insert_from_max) - insertion that searches from the cached
//!   maximum and reports its cost and the inversions it introduced
//!
//! Every mutation returns a rebalance count: rotations performed plus ancestors whose height
//! changed.
//!
//! # Example
//!
//! ```
//! use finger_avl::AvlTreeMap;
//!
//! // Measure how far a sequence is from sorted.
//! let mut map = AvlTreeMap::new();
//! let mut inversions = 0;
//! for key in [3, 1, 2, 5, 4] {
//!     inversions += map.insert_from_max(key, ()).unwrap().substitutions;
//! }
//! assert_eq!(inversions, 3);
//!
//! // Order statistics over the result.
//! assert_eq!(*map.select(2).unwrap().key(), 2);
//! assert_eq!(map.rank_of(&5), Some(5));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Stable node ids** - [`NodeId`]s detect removal instead of dangling
//! - **O(1) maximum** - The maximum is cached and kept current across every mutation
//!
//! # Implementation
//!
//! Nodes live in a contiguous arena and refer to each other by generation-checked handles.
//! The root hangs off a virtual sentinel, so every real node has a parent link and an ascent
//! after insertion or deletion terminates at the sentinel.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod avl_tree_map;

pub use avl_tree_map::{AvlTreeMap, FingerInsert, NodeId, NodeRef};
pub use error::Error;
