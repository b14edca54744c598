//! Walking a [`Tree`] in order, pre-order and post-order, and drawing its shape.
//!
//! Every walk here is iterative: an unbalanced tree can be as tall as it is large.

use std::fmt;
use std::iter::FusedIterator;

use crate::node::{Node, NodePolicy};
use crate::tree::Tree;

/// An in-order iterator over the keys of a [`Tree`], created by [`Tree::iter`].
///
/// It follows parent links instead of keeping a stack, so it uses constant extra space.
pub struct Iter<'a, K, M> {
    next: Option<&'a Node<K, M>>,
    remaining: usize,
}

impl<K, M> Clone for Iter<'_, K, M> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, M> Iterator for Iter<'a, K, M> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next();
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, M> ExactSizeIterator for Iter<'_, K, M> {}
impl<K, M> FusedIterator for Iter<'_, K, M> {}

impl<'a, K, P: NodePolicy<K>> IntoIterator for &'a Tree<K, P> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, P::Meta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, P: NodePolicy<K>> Tree<K, P> {
    /// Iterates over the keys in ascending order. Duplicates come out next to each other.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// for key in [2, 3, 1, 2] {
    ///     tree.insert(key);
    /// }
    ///
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, P::Meta> {
        Iter {
            next: self.root().map(Node::leftmost),
            remaining: self.len(),
        }
    }

    /// The keys in pre-order: each node before its left subtree, then its right subtree.
    pub fn pre_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut stack: Vec<_> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            keys.push(&node.key);
            stack.extend(node.right());
            stack.extend(node.left());
        }
        keys
    }

    /// The keys in post-order: each node after its left subtree and then its right subtree.
    pub fn post_order(&self) -> Vec<&K> {
        // Node, right, left, reversed.
        let mut keys = Vec::with_capacity(self.len());
        let mut stack: Vec<_> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            keys.push(&node.key);
            stack.extend(node.left());
            stack.extend(node.right());
        }
        keys.reverse();
        keys
    }
}

impl<K, P> fmt::Display for Tree<K, P>
where
    K: fmt::Display,
    P: NodePolicy<K>,
{
    /// Draws the tree sideways. See [`Shape`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => fmt::Display::fmt(&root.shape(), f),
            None => Ok(()),
        }
    }
}

impl<K, M> Node<K, M> {
    /// Draws the subtree rooted at this node. See [`Shape`].
    pub fn shape(&self) -> Shape<'_, K, M> {
        Shape(self)
    }
}

/// A subtree drawn sideways, one key per line: right subtrees above their parent, left subtrees
/// below it.
///
/// # Examples
///
/// ```
/// use search_tree::Tree;
///
/// let mut tree = Tree::new();
/// for key in [5, 3, 8, 7] {
///     tree.insert(key);
/// }
///
/// let expected = "\
/// \x20/----- 8
/// \x20|       \\----- 7
/// 5
/// \x20\\----- 3
/// ";
/// assert_eq!(tree.to_string(), expected);
/// ```
pub struct Shape<'a, K, M>(&'a Node<K, M>);

#[derive(Clone, Copy)]
enum Side {
    Root,
    Right,
    Left,
}

enum Frame<'a, K, M> {
    /// Expand a subtree into its right child, itself and its left child.
    Visit(&'a Node<K, M>, String, Side),
    /// Write a single line.
    Emit(&'a Node<K, M>, String, Side),
}

impl<K, M> fmt::Display for Shape<'_, K, M>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Right subtree first, so the stack gets the left side pushed first.
        let mut stack = vec![Frame::Visit(self.0, String::new(), Side::Root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(node, indent, side) => {
                    let (right_indent, left_indent) = match side {
                        Side::Root => (String::new(), String::new()),
                        Side::Right => (indent.clone() + "        ", indent.clone() + " |      "),
                        Side::Left => (indent.clone() + " |      ", indent.clone() + "        "),
                    };
                    if let Some(left) = node.left() {
                        stack.push(Frame::Visit(left, left_indent, Side::Left));
                    }
                    stack.push(Frame::Emit(node, indent, side));
                    if let Some(right) = node.right() {
                        stack.push(Frame::Visit(right, right_indent, Side::Right));
                    }
                }
                Frame::Emit(node, indent, side) => match side {
                    Side::Root => writeln!(f, "{}", node.key)?,
                    Side::Right => writeln!(f, "{indent} /----- {}", node.key)?,
                    Side::Left => writeln!(f, "{indent} \\----- {}", node.key)?,
                },
            }
        }
        Ok(())
    }
}
