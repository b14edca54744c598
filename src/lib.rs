//! This crate exposes an in-memory ordered index of keys built on an unbalanced Binary Search
//! Tree (BST) with parent pointers.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and
//! sometimes has child `Node`s. The invariants of this BST are:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a key less
//!    than its own key.
//! 2. For every `Node`, all the `Node`s in its right subtree have a key greater
//!    than or equal to its own key. Inserting a key that is already present
//!    stores a second copy to the right.
//! 3. Every `Node` except the root points back at the `Node` it hangs off.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching, inserting and deleting take `O(height)` (where `height` is defined as
//! the longest path from the root `Node` to a leaf `Node`). This tree does not
//! rebalance itself, so the height is `O(lg N)` for well-mixed input but `O(N)`
//! when keys arrive sorted.
//!
//! Tree variants that need extra per-node data plug a [`NodePolicy`] into the
//! [`Tree`] instead of reimplementing the algorithms.
//!
//! # Examples
//!
//! ```
//! use search_tree::Tree;
//!
//! let mut tree = Tree::new();
//! for key in [5, 3, 8] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.contains(&3));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 5, 8]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
mod node;
mod traverse;
mod tree;

#[cfg(test)]
mod test;

pub use error::TreeError;
pub use node::{Node, NodePolicy, Plain};
pub use traverse::{Iter, Shape};
pub use tree::{Removed, Tree};
