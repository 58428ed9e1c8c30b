use thiserror::Error;

/// The ways a call can break an [`AvlTreeMap`](crate::AvlTreeMap) operation's precondition.
///
/// A call that returns an `Error` leaves the map exactly as it was.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// The [`NodeId`](crate::NodeId) does not refer to a node currently in the map.
    #[error("node id does not refer to a node in this map")]
    StaleNode,

    /// A rank outside `1..=len` was passed to [`select`](crate::AvlTreeMap::select).
    #[error("rank {rank} is out of bounds for a map of {len} entries")]
    RankOutOfBounds { rank: usize, len: usize },

    /// [`max_range`](crate::AvlTreeMap::max_range) was called with `low >= high`.
    #[error("range lower bound is not below its upper bound")]
    InvalidRange,

    /// [`insert_from_max`](crate::AvlTreeMap::insert_from_max) was called with a key already present.
    #[error("key is already present in the map")]
    DuplicateKey,
}
