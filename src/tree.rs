//! An unbalanced BST with parent pointers. Children are owned by their parent, parents are only
//! pointed back at, and nodes are never moved or copied once inserted: deletion rewires links
//! around the removed node instead of swapping contents.
//!
//! There is no rebalancing, so the height (and with it the cost of every operation) is only
//! logarithmic for well-mixed input. Inserting sorted keys degrades the tree into a list.
//!
//! The tree is not synchronized. It is `Send` and `Sync` when its contents are, so callers that
//! need to share it wrap it in a `Mutex` or `RwLock`.
//!
//! # Examples
//!
//! ```
//! use search_tree::{Tree, TreeError};
//!
//! let mut tree = Tree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key);
//! }
//!
//! assert_eq!(tree.len(), 7);
//! assert_eq!(tree.minimum(), Ok(&1));
//! assert_eq!(tree.successor(&5), Ok(&7));
//! assert_eq!(tree.successor(&9), Err(TreeError::NoSuccessor));
//!
//! // Deleting a node with two children moves its successor into its place.
//! let removed = tree.delete(&8).unwrap();
//! assert_eq!(removed.key, 8);
//! assert_eq!(removed.replacement.map(|n| *n.key()), Some(9));
//!
//! // Deleting a missing key does nothing.
//! assert!(tree.delete(&42).is_none());
//! assert_eq!(tree.len(), 6);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::{debug, trace};

use crate::error::TreeError;
use crate::node::{Link, Node, NodePolicy, Plain};

type NodePtr<K, M> = NonNull<Node<K, M>>;

/// A Binary Search Tree of keys. Equal keys are allowed and are stored to the right of each
/// other.
pub struct Tree<K, P: NodePolicy<K> = Plain> {
    // A `Link` rather than an owned node so that moving the `Tree` doesn't break the root's
    // children's parent pointers.
    root: Link<K, P::Meta>,
    size: usize,
    policy: P,
    marker: PhantomData<Box<Node<K, P::Meta>>>,
}

/// What [`Tree::delete`] took out of the tree.
pub struct Removed<'a, K, M> {
    /// The key of the deleted node.
    pub key: K,
    /// The metadata of the deleted node.
    pub meta: M,
    /// The node now sitting where the deleted node was. `None` when a leaf was deleted.
    pub replacement: Option<&'a Node<K, M>>,
}

impl<K, M> fmt::Debug for Removed<'_, K, M>
where
    K: fmt::Debug,
    M: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Removed")
            .field("key", &self.key)
            .field("meta", &self.meta)
            .field("replacement", &self.replacement.map(Node::key))
            .finish()
    }
}

// SAFETY: A `Tree` exclusively owns every node reachable from its root, exactly like a tree of
// `Box`es would. Node pointers only escape as borrows of the tree, so sending or sharing the tree
// is as safe as sending or sharing its keys and metadata.
unsafe impl<K, P> Send for Tree<K, P>
where
    K: Send,
    P: NodePolicy<K> + Send,
    P::Meta: Send,
{
}

// SAFETY: See the `Send` impl. `&Tree` only hands out shared borrows.
unsafe impl<K, P> Sync for Tree<K, P>
where
    K: Sync,
    P: NodePolicy<K> + Sync,
    P::Meta: Sync,
{
}

impl<K> Tree<K> {
    /// Generate a new, empty `Tree` of plain nodes.
    pub fn new() -> Self {
        Self::with_policy(Plain)
    }
}

impl<K, P> Default for Tree<K, P>
where
    P: NodePolicy<K> + Default,
{
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<K, P: NodePolicy<K>> Drop for Tree<K, P> {
    fn drop(&mut self) {
        self.free_all();
    }
}

impl<K, P> Clone for Tree<K, P>
where
    K: Clone,
    P: NodePolicy<K> + Clone,
    P::Meta: Clone,
{
    /// Copies every node, keeping the shape of the tree and each node's metadata.
    fn clone(&self) -> Self {
        let mut tree = Self::with_policy(self.policy.clone());
        let Some(root) = self.root() else {
            return tree;
        };

        let new_root = Node::alloc(root.key.clone(), root.meta.clone(), Link::NONE);
        tree.root = Link::to(new_root);
        tree.size = self.size;

        let mut stack = vec![(root, new_root)];
        while let Some((source, copy)) = stack.pop() {
            if let Some(left) = source.left() {
                let new_left = Node::alloc(left.key.clone(), left.meta.clone(), Link::to(copy));
                // SAFETY: `copy` was allocated above, is owned by `tree` and nothing borrows it.
                unsafe { (*copy.as_ptr()).left = Link::to(new_left) };
                stack.push((left, new_left));
            }
            if let Some(right) = source.right() {
                let new_right = Node::alloc(right.key.clone(), right.meta.clone(), Link::to(copy));
                // SAFETY: See above.
                unsafe { (*copy.as_ptr()).right = Link::to(new_right) };
                stack.push((right, new_right));
            }
        }

        tree
    }
}

impl<K, P> fmt::Debug for Tree<K, P>
where
    K: fmt::Debug,
    P: NodePolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("size", &self.size)
            .field("keys", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<K, P: NodePolicy<K>> Tree<K, P> {
    /// Generate a new, empty `Tree` whose nodes are built by `policy`.
    pub fn with_policy(policy: P) -> Self {
        Self {
            root: Link::NONE,
            size: 0,
            policy,
            marker: PhantomData,
        }
    }

    /// The policy building this tree's nodes.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The root node, if the tree isn't empty.
    pub fn root(&self) -> Option<&Node<K, P::Meta>> {
        // SAFETY: The root is either empty or a live node owned by this tree. Taking `&self`
        // means nothing can mutate the node graph while the returned borrow lives.
        unsafe { self.root.as_ref() }
    }

    /// The number of nodes on the longest path from the root to a leaf. `0` for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<_> = self.root().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.left().map(|n| (n, depth + 1)));
            stack.extend(node.right().map(|n| (n, depth + 1)));
        }
        height
    }

    /// Finds the node holding `key`. With duplicates, this is the copy closest to the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.search(&1).map(|n| *n.key()), Some(1));
    /// assert!(tree.search(&42).is_none());
    /// ```
    pub fn search(&self, key: &K) -> Option<&Node<K, P::Meta>>
    where
        K: Ord,
    {
        // SAFETY: `search_ptr` only yields live nodes of this tree and `&self` keeps the graph
        // from being mutated while the borrow lives.
        self.search_ptr(key).map(|node| unsafe { &*node.as_ptr() })
    }

    /// Whether some node holds `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        self.search_ptr(key).is_some()
    }

    /// Stores `key` in a new leaf and returns it. Keys equal to an existing key go to its right.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2);
    ///
    /// let node = tree.insert(1);
    /// assert!(node.is_leaf());
    /// assert_eq!(node.parent().map(|p| *p.key()), Some(2));
    /// ```
    pub fn insert(&mut self, key: K) -> &Node<K, P::Meta>
    where
        K: Ord,
    {
        let mut parent = Link::NONE;
        let mut goes_left = false;
        let mut depth = 0usize;
        let mut current = self.root.0;
        while let Some(ptr) = current {
            // SAFETY: Every link reachable from the root points at a live node and `&mut self`
            // guarantees nobody else borrows it.
            let node = unsafe { ptr.as_ref() };
            parent = Link::to(ptr);
            goes_left = key < node.key;
            current = if goes_left { node.left.0 } else { node.right.0 };
            depth += 1;
        }

        // SAFETY: `parent` is empty or a live node of this tree; the borrow ends before any link
        // is written.
        let meta = self.policy.create_meta(&key, unsafe { parent.as_ref() });
        let node = Node::alloc(key, meta, parent);
        match parent.0 {
            None => self.root = Link::to(node),
            // SAFETY: `parent` is a live node of this tree with an empty slot on the chosen side,
            // and nothing borrows it.
            Some(parent) => unsafe {
                if goes_left {
                    (*parent.as_ptr()).left = Link::to(node);
                } else {
                    (*parent.as_ptr()).right = Link::to(node);
                }
            },
        }
        self.size += 1;
        trace!("inserted {node:p} at depth {depth}, size {}", self.size);

        // SAFETY: `node` was just linked into this tree and the borrow is tied to `&mut self`.
        let node = unsafe { &*node.as_ptr() };
        if cfg!(debug_assertions) {
            if let Some(parent) = node.parent() {
                if goes_left {
                    assert!(node.key < parent.key);
                    assert!(parent.left.0 == Some(NonNull::from(node)));
                } else {
                    assert!(node.key >= parent.key);
                    assert!(parent.right.0 == Some(NonNull::from(node)));
                }
            }
        }
        node
    }

    /// Deletes the node holding `key`. Returns `None`, leaving the tree untouched, if there is no
    /// such node.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    ///
    /// let removed = tree.delete(&1).unwrap();
    /// assert_eq!(removed.key, 1);
    /// assert!(removed.replacement.is_none());
    ///
    /// assert!(tree.delete(&1).is_none());
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K) -> Option<Removed<'_, K, P::Meta>>
    where
        K: Ord,
    {
        let Some(node) = self.search_ptr(key) else {
            debug!("delete missed, {} nodes left untouched", self.size);
            return None;
        };

        // SAFETY: `node` is a live node of this tree and nothing borrows the tree.
        let replacement = unsafe { self.delete_node(node) };
        // SAFETY: `delete_node` removed every link pointing at `node`, so nothing can reach it.
        let (key, meta) = unsafe { Node::free(node) };

        if cfg!(debug_assertions) {
            // SAFETY: The replacement is a live node of this tree.
            if let Some(replacement) = unsafe { replacement.as_ref() } {
                for child in [replacement.left(), replacement.right()].into_iter().flatten() {
                    assert!(child.parent.0 == Some(NonNull::from(replacement)));
                }
            }
            assert_eq!(self.root.is_none(), self.size == 0);
        }

        Some(Removed {
            key,
            meta,
            // SAFETY: The borrow is tied to `&mut self`, so the graph can't change under it.
            replacement: unsafe { replacement.as_ref() },
        })
    }

    /// The smallest key in the tree.
    pub fn minimum(&self) -> Result<&K, TreeError> {
        self.root()
            .map(|root| &root.leftmost().key)
            .ok_or(TreeError::EmptyTree)
    }

    /// The largest key in the tree.
    pub fn maximum(&self) -> Result<&K, TreeError> {
        self.root()
            .map(|root| &root.rightmost().key)
            .ok_or(TreeError::EmptyTree)
    }

    /// The smallest key strictly greater than `key`, which must be in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_tree::{Tree, TreeError};
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1);
    /// tree.insert(3);
    ///
    /// assert_eq!(tree.successor(&1), Ok(&3));
    /// assert_eq!(tree.successor(&2), Err(TreeError::NotFound));
    /// assert_eq!(tree.successor(&3), Err(TreeError::NoSuccessor));
    /// ```
    pub fn successor(&self, key: &K) -> Result<&K, TreeError>
    where
        K: Ord,
    {
        if self.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let mut node = self.search(key).ok_or(TreeError::NotFound)?;
        // Skip over the other copies of a duplicated key.
        loop {
            node = node.next().ok_or(TreeError::NoSuccessor)?;
            if node.key > *key {
                return Ok(&node.key);
            }
        }
    }

    /// Deletes every node.
    pub fn clear(&mut self) {
        self.free_all();
    }

    /// Walks the whole tree and checks its structural invariants: keys are ordered, every child
    /// points back at its parent, the root has no parent and the size matches the node count.
    pub fn check_invariants(&self) -> Result<(), TreeError>
    where
        K: Ord,
    {
        let Some(root) = self.root() else {
            return match self.size {
                0 => Ok(()),
                _ => Err(TreeError::Corrupted("empty tree with non-zero size")),
            };
        };
        if !root.is_root() {
            return Err(TreeError::Corrupted("root has a parent"));
        }

        let mut count = 0;
        // Each entry carries the inclusive lower and exclusive upper bound of its subtree.
        let mut stack: Vec<(&Node<K, P::Meta>, Option<&K>, Option<&K>)> = vec![(root, None, None)];
        while let Some((node, lower, upper)) = stack.pop() {
            count += 1;
            if lower.map_or(false, |lower| node.key < *lower) {
                return Err(TreeError::Corrupted("right subtree key below its ancestor"));
            }
            if upper.map_or(false, |upper| node.key >= *upper) {
                return Err(TreeError::Corrupted("left subtree key not below its ancestor"));
            }
            if node.left.is_some_and_eq(node.right) {
                return Err(TreeError::Corrupted("both children are the same node"));
            }
            for child in [node.left(), node.right()].into_iter().flatten() {
                if child.parent.0 != Some(NonNull::from(node)) {
                    return Err(TreeError::Corrupted("child does not point back at its parent"));
                }
            }
            if let Some(left) = node.left() {
                stack.push((left, lower, Some(&node.key)));
            }
            if let Some(right) = node.right() {
                stack.push((right, Some(&node.key), upper));
            }
        }

        if count != self.size {
            return Err(TreeError::Corrupted("size does not match the node count"));
        }
        Ok(())
    }

    fn search_ptr(&self, key: &K) -> Option<NodePtr<K, P::Meta>>
    where
        K: Ord,
    {
        let mut current = self.root.0;
        while let Some(ptr) = current {
            // SAFETY: Every link reachable from the root points at a live node.
            let node = unsafe { ptr.as_ref() };
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.0,
                Ordering::Equal => return Some(ptr),
                Ordering::Greater => node.right.0,
            };
        }
        None
    }

    /// Unlinks `node` from the tree and returns whatever took its place. `node` itself is left
    /// allocated (still pointing at its old neighbours) for the caller to free.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree and nothing may borrow any node of the tree.
    unsafe fn delete_node(&mut self, node: NodePtr<K, P::Meta>) -> Link<K, P::Meta> {
        let deleted = node.as_ptr();
        let replacement = match ((*deleted).left.0, (*deleted).right.0) {
            (None, right) => {
                trace!("deleting {node:p} with no left child");
                self.transplant(node, Link(right))
            }
            (left, None) => {
                trace!("deleting {node:p} with no right child");
                self.transplant(node, Link(left))
            }
            (Some(left), Some(right)) => {
                trace!("deleting {node:p} with two children");
                // The leftmost node of the right subtree never has a left child.
                let successor = leftmost(right);
                let moved = successor.as_ptr();
                // Unhook the successor before adopting `right`, otherwise a direct right child
                // would become its own child.
                if (*moved).parent != Link::to(node) {
                    self.transplant(successor, (*moved).right);
                    (*moved).right = Link::to(right);
                    (*right.as_ptr()).parent = Link::to(successor);
                }
                self.transplant(node, Link::to(successor));
                (*moved).left = Link::to(left);
                (*left.as_ptr()).parent = Link::to(successor);
                Link::to(successor)
            }
        };
        self.size -= 1;
        trace!("size {} after delete", self.size);
        replacement
    }

    /// Puts `new` in the slot `old` occupies in its parent (or at the root) and points `new` back
    /// at that parent. Neither node's children are touched.
    ///
    /// # Safety
    ///
    /// `old` must be a live node of this tree, `new` must be empty or a live node, and nothing
    /// may borrow any node of the tree.
    unsafe fn transplant(
        &mut self,
        old: NodePtr<K, P::Meta>,
        new: Link<K, P::Meta>,
    ) -> Link<K, P::Meta> {
        let parent = (*old.as_ptr()).parent;
        match parent.0 {
            None => self.root = new,
            Some(p) if (*p.as_ptr()).left == Link::to(old) => (*p.as_ptr()).left = new,
            Some(p) => (*p.as_ptr()).right = new,
        }
        if let Some(new) = new.0 {
            (*new.as_ptr()).parent = parent;
        }
        trace!("transplanted {new:?} into the slot of {old:p}");
        new
    }

    /// Frees every node without recursing, so degenerate trees of any height can be dropped.
    fn free_all(&mut self) {
        let mut stack: Vec<_> = self.root.0.take().into_iter().collect();
        self.size = 0;
        while let Some(node) = stack.pop() {
            // SAFETY: Each node is reachable from exactly one link and that link was either the
            // root (taken above) or a child link of a node already freed, so it is freed once.
            unsafe {
                stack.extend((*node.as_ptr()).left.0);
                stack.extend((*node.as_ptr()).right.0);
                Node::free(node);
            }
        }
    }
}

/// Follows left links from `node` down to the end.
///
/// # Safety
///
/// `node` must be a live node whose subtree nobody mutably borrows.
unsafe fn leftmost<K, M>(mut node: NodePtr<K, M>) -> NodePtr<K, M> {
    while let Some(left) = (*node.as_ptr()).left.0 {
        node = left;
    }
    node
}

impl<K, M> Link<K, M> {
    /// Whether both links point at the same node (two empty links don't count).
    fn is_some_and_eq(self, other: Self) -> bool {
        self.0.is_some() && self == other
    }
}

impl<K, M> Node<K, M> {
    /// The node holding the smallest key of this subtree.
    pub fn leftmost(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The node holding the largest key of this subtree.
    pub fn rightmost(&self) -> &Self {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The node visited right after this one in order, if any. Its key may equal this one's.
    pub fn next(&self) -> Option<&Self> {
        if let Some(right) = self.right() {
            return Some(right.leftmost());
        }
        // Climb until we leave a left subtree.
        let mut current = self;
        let mut parent = self.parent();
        while let Some(p) = parent {
            if p.right.0 != Some(NonNull::from(current)) {
                break;
            }
            current = p;
            parent = p.parent();
        }
        parent
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeMap;
    use std::ops::Bound;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and to a multiset of keys. This way we can ensure
    /// that after a random smattering of inserts and deletes both hold the same keys.
    fn do_ops<K>(ops: &[Op<K>], bst: &mut Tree<K>, model: &mut BTreeMap<K, usize>)
    where
        K: Ord + Clone + fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Insert(k) => {
                    assert_eq!(bst.insert(k.clone()).key(), k);
                    *model.entry(k.clone()).or_default() += 1;
                }
                Op::Remove(k) => {
                    let expected = match model.get_mut(k) {
                        Some(count) => {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(k);
                            }
                            Some(k.clone())
                        }
                        None => None,
                    };
                    assert_eq!(bst.delete(k).map(|removed| removed.key), expected);
                }
                Op::Successor(k) => {
                    let expected = if model.contains_key(k) {
                        model
                            .range((Bound::Excluded(k), Bound::Unbounded))
                            .next()
                            .map(|(key, _)| key)
                            .ok_or(TreeError::NoSuccessor)
                    } else if model.is_empty() {
                        Err(TreeError::EmptyTree)
                    } else {
                        Err(TreeError::NotFound)
                    };
                    assert_eq!(bst.successor(k), expected);
                }
                Op::Iter => {
                    let expected: Vec<_> = model
                        .iter()
                        .flat_map(|(k, count)| std::iter::repeat(k).take(*count))
                        .collect();
                    assert_eq!(bst.iter().collect::<Vec<_>>(), expected);
                }
            }
            assert_eq!(bst.check_invariants(), Ok(()));
            assert_eq!(bst.len(), model.values().sum::<usize>());
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut model = BTreeMap::new();

            do_ops(&ops, &mut tree, &mut model);
            model.keys().all(|key| tree.contains(key))
        }
    }

    quickcheck::quickcheck! {
        fn min_and_max_match_the_model(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut model = BTreeMap::new();

            do_ops(&ops, &mut tree, &mut model);
            tree.minimum().ok() == model.keys().next()
                && tree.maximum().ok() == model.keys().next_back()
        }
    }
}
