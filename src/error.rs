//! Errors returned by queries that have no sensible value to return.

use thiserror::Error;

/// Failures of the boundary queries on a [`Tree`](crate::Tree). Lookups that can simply miss
/// (`search`, `contains`, `delete`) return an `Option` instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The tree holds no nodes.
    #[error("the tree is empty")]
    EmptyTree,

    /// The requested key is not stored in the tree.
    #[error("key not found in the tree")]
    NotFound,

    /// The requested key is the largest key in the tree.
    #[error("key has no successor")]
    NoSuccessor,

    /// The node graph broke one of its structural invariants.
    #[error("tree invariant violated: {0}")]
    Corrupted(&'static str),
}
