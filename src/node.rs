//! The nodes stored in a [`Tree`](crate::Tree) and the policy used to build them.
//!
//! Every `Node` owns its two children and holds a non-owning pointer back to its parent. Nodes
//! are only ever created by the tree during insertion (through a [`NodePolicy`]) and only ever
//! freed by the tree during deletion or when the tree itself is dropped.

use std::fmt;
use std::ptr::NonNull;

/// The construction hook called by a [`Tree`](crate::Tree) for every inserted key.
///
/// Tree variants that need extra per-node data (a balance factor, a color, a subtree count, ...)
/// implement this to attach it. The search, insert and delete algorithms are the same for every
/// policy.
///
/// # Examples
///
/// ```
/// use search_tree::{Node, NodePolicy, Tree};
///
/// /// Remembers how deep each node was when it was inserted.
/// struct Depth;
///
/// impl<K> NodePolicy<K> for Depth {
///     type Meta = usize;
///
///     fn create_meta(&mut self, _key: &K, parent: Option<&Node<K, usize>>) -> usize {
///         parent.map_or(0, |p| p.meta() + 1)
///     }
/// }
///
/// let mut tree = Tree::with_policy(Depth);
/// tree.insert(5);
/// tree.insert(3);
/// let four = tree.insert(4);
///
/// assert_eq!(*four.meta(), 2);
/// ```
pub trait NodePolicy<K> {
    /// Extra data stored in every node.
    type Meta;

    /// Builds the metadata of a node about to be linked under `parent` (`None` for a new root).
    /// The new node has no children yet.
    fn create_meta(&mut self, key: &K, parent: Option<&Node<K, Self::Meta>>) -> Self::Meta;
}

/// The default policy: nodes carry nothing but their key and links.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plain;

impl<K> NodePolicy<K> for Plain {
    type Meta = ();

    fn create_meta(&mut self, _key: &K, _parent: Option<&Node<K, ()>>) {}
}

/// A single stored key, its policy metadata and its links to the rest of the tree.
pub struct Node<K, M = ()> {
    pub(crate) key: K,
    pub(crate) meta: M,
    pub(crate) parent: Link<K, M>,
    pub(crate) left: Link<K, M>,
    pub(crate) right: Link<K, M>,
}

impl<K, M> Node<K, M> {
    /// Allocates a childless node hanging off `parent` and hands ownership to the caller in the
    /// form of a pointer. It must eventually be released with [`Node::free`].
    pub(crate) fn alloc(key: K, meta: M, parent: Link<K, M>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            key,
            meta,
            parent,
            left: Link::NONE,
            right: Link::NONE,
        })))
    }

    /// Releases a node allocated by [`Node::alloc`] and returns what it stored. Its children are
    /// not touched.
    ///
    /// # Safety
    ///
    /// `node` must come from [`Node::alloc`], must not have been freed yet and must not be
    /// reachable from any tree afterwards.
    pub(crate) unsafe fn free(node: NonNull<Self>) -> (K, M) {
        let Node { key, meta, .. } = *Box::from_raw(node.as_ptr());
        (key, meta)
    }

    /// The key stored in this node.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The metadata the tree's [`NodePolicy`] attached to this node.
    pub fn meta(&self) -> &M {
        &self.meta
    }

    /// The node this one hangs off, or `None` for the root.
    pub fn parent(&self) -> Option<&Self> {
        // SAFETY: Links inside a tree always point at live nodes owned by that tree, and a shared
        // borrow of this node implies a shared borrow of the tree.
        unsafe { self.parent.as_ref() }
    }

    /// The root of the left subtree, if any.
    pub fn left(&self) -> Option<&Self> {
        // SAFETY: See `Node::parent`.
        unsafe { self.left.as_ref() }
    }

    /// The root of the right subtree, if any.
    pub fn right(&self) -> Option<&Self> {
        // SAFETY: See `Node::parent`.
        unsafe { self.right.as_ref() }
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<K, M> fmt::Debug for Node<K, M>
where
    K: fmt::Debug,
    M: fmt::Debug,
{
    // Only the neighbours' keys: a degenerate tree would recurse as deep as it is tall.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("meta", &self.meta)
            .field("parent", &self.parent().map(Node::key))
            .field("left", &self.left().map(Node::key))
            .field("right", &self.right().map(Node::key))
            .finish()
    }
}

/// A possibly empty pointer to a node. Child links own the node they point at; parent links
/// don't.
pub(crate) struct Link<K, M>(pub(crate) Option<NonNull<Node<K, M>>>);

impl<K, M> Clone for Link<K, M> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K, M> Copy for Link<K, M> {}

impl<K, M> PartialEq for Link<K, M> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<K, M> Eq for Link<K, M> {}

impl<K, M> fmt::Debug for Link<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ptr) => write!(f, "Link({ptr:p})"),
            None => f.write_str("Link(None)"),
        }
    }
}

impl<K, M> Link<K, M> {
    pub(crate) const NONE: Self = Link(None);

    pub(crate) fn to(node: NonNull<Node<K, M>>) -> Self {
        Link(Some(node))
    }

    pub(crate) fn is_none(self) -> bool {
        self.0.is_none()
    }

    /// # Safety
    ///
    /// The pointee must be alive for `'a` and must not be mutably borrowed during `'a`.
    pub(crate) unsafe fn as_ref<'a>(self) -> Option<&'a Node<K, M>> {
        self.0.map(|ptr| &*ptr.as_ptr())
    }
}
