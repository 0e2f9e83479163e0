//! An AVL tree over integer keys, rebalanced by backtracing the descent path.

// Conventions used in comments:
// - The height of an empty slot is 0 and the height of a leaf is 1.
// - The balance factor of a node `x` is `h(x.left) - h(x.right)` and is denoted `bf(x)`.
// - A slot is an owning child link of a node, or the root link of the tree.
//
// The invariants of the tree at rest are:
// 1. Every key in the left subtree of `x` is less than `x.key`, every key in its right subtree
//    is greater.
// 2. `|bf(x)| <= 1` for every node `x`.
// 3. Every cached height equals the height recomputed from scratch.
//
// Nodes never point at their parents. A mutation records the directions it took from the root
// (its trace) and walks the trace back up to rebalance. A rotation only restructures the subtree
// under the slot it is applied to, so the directions leading to every remaining trace entry stay
// valid until that entry is examined.
//
// Two-children deletions unlink the in-order successor without adding the successor's ancestors
// to the trace. Their heights are refreshed but they are never rotated, so an imbalance below the
// deleted key can survive the deletion. A later mutation whose trace passes through it repairs it,
// even a delete of a missing key. See `AvlTree::delete`.

use core::{cmp::Ordering, mem, ops::Not};

mod balance;
mod debug;
mod error;
mod iter;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod rotate;
pub mod script;

pub use error::{DeleteMiss, Miss};
pub use iter::{Iter, Range};
pub use rotate::{Rotated, Rotation};

/// The key type stored in an [`AvlTree`].
pub type Key = i64;

/// A height-balanced binary search tree of unique [`Key`]s.
///
/// Every mutation restores the AVL property with at most one rotation per ancestor of the edited
/// node, and reports the rotations it performed.
#[derive(Debug, Default)]
pub struct AvlTree {
    root: Link,
    len: usize,
}

#[derive(Debug)]
pub(crate) struct Node {
    key: Key,
    height: u32,
    children: [Link; 2],
}

pub(crate) type Link = Option<Box<Node>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// The structural case handled by a successful [`AvlTree::delete`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteCase {
    /// The deleted node had no children and was detached.
    Leaf,
    /// The deleted node had one child, which took its place.
    OneChild,
    /// The deleted node had two children. Its key was overwritten by `successor`, the minimum of
    /// its right subtree, and the successor's node was unlinked instead.
    TwoChildren {
        successor: Key,
        /// `true` if the successor was the immediate right child of the deleted node.
        direct: bool,
    },
}

/// The result of a successful [`AvlTree::delete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deletion {
    pub case: DeleteCase,
    pub rotations: Vec<Rotated>,
}

// The ancestors visited while descending to a structural edit.
//
// Entry `i` is the node reached from the root by following `path[..i]`. The entry nearest the
// edit is popped first.
#[derive(Debug, Default)]
struct Trace {
    path: Vec<Dir>,
    len: usize,
}

impl Trace {
    // Records the node at the end of the path and steps to its `dir` child.
    fn descend(&mut self, dir: Dir) {
        self.path.push(dir);
        self.len = self.path.len();
    }

    // Records the node at the end of the path.
    fn visit(&mut self) {
        self.len = self.path.len() + 1;
    }

    // Removes the entry nearest the edit and returns the directions leading to it.
    fn pop(&mut self) -> Option<&[Dir]> {
        let depth = self.len.checked_sub(1)?;
        self.len = depth;
        Some(&self.path[..depth])
    }
}

impl AvlTree {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        let empty = self.len == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the key stored at the root.
    pub fn root(&self) -> Option<Key> {
        self.root.as_deref().map(Node::key)
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single key.
    pub fn height(&self) -> u32 {
        balance::height(&self.root)
    }

    /// Returns the balance factor of the node holding `key`.
    pub fn balance_factor(&self, key: Key) -> Option<i32> {
        self.find(key).map(Node::balance_factor)
    }

    /// Removes every key, resetting the tree to empty.
    pub fn clear(&mut self) {
        // Dismantle iteratively so that dropping a tall tree cannot exhaust the stack.
        let mut pending: Vec<Box<Node>> = self.root.take().into_iter().collect();

        while let Some(mut node) = pending.pop() {
            pending.extend(node.take_child(Dir::Left));
            pending.extend(node.take_child(Dir::Right));
        }

        self.len = 0;
    }

    /// Looks up `key`.
    ///
    /// This is a read-only descent and never rebalances.
    pub fn search(&self, key: Key) -> Result<Key, Miss> {
        if self.root.is_none() {
            return Err(Miss::EmptyTree);
        }

        self.find(key)
            .map(Node::key)
            .ok_or(Miss::KeyNotFound(key))
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// Returns the minimum key of the tree.
    pub fn first(&self) -> Option<Key> {
        let mut cur = self.root.as_deref()?;

        while let Some(left) = cur.child(Dir::Left) {
            cur = left;
        }

        Some(cur.key)
    }

    /// Returns the maximum key of the tree.
    pub fn last(&self) -> Option<Key> {
        let mut cur = self.root.as_deref()?;

        while let Some(right) = cur.child(Dir::Right) {
            cur = right;
        }

        Some(cur.key)
    }

    /// Returns an iterator over all keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Returns an iterator over the keys `k` with `low <= k <= high`, in ascending order.
    ///
    /// The iterator is empty if `low > high`.
    pub fn range(&self, low: Key, high: Key) -> Range<'_> {
        Range::new(self, low, high)
    }

    fn find(&self, key: Key) -> Option<&Node> {
        let mut opt_cur = self.root.as_deref();

        loop {
            let cur = opt_cur?;

            match key.cmp(&cur.key) {
                Ordering::Less => opt_cur = cur.child(Dir::Left),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = cur.child(Dir::Right),
            }
        }
    }

    /// Inserts `key` as a new leaf and rebalances its ancestors.
    ///
    /// Returns the rotations performed, nearest the new leaf first. Inserting a key that is already
    /// present leaves the tree untouched and returns [`Miss::DuplicateKey`].
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: Key) -> Result<Vec<Rotated>, Miss> {
        let mut trace = Trace::default();
        let mut slot = &mut self.root;

        // Descend the tree, looking for an empty slot.
        while let Some(node) = slot {
            let dir = match key.cmp(&node.key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(Miss::DuplicateKey(key)),
                Ordering::Greater => Dir::Right,
            };

            trace.descend(dir);
            slot = &mut node.children[dir as usize];
        }

        *slot = Some(Node::leaf(key));
        trace.visit();
        self.len += 1;

        tracing::trace!(key, depth = trace.path.len(), "inserted leaf");

        Ok(self.rebalance(trace))
    }

    /// Removes `key` and rebalances the ancestors of the structural edit.
    ///
    /// A node with two children takes the key of its in-order successor, whose node is unlinked
    /// in its place. Only the path down to the deleted key is rebalanced: the nodes between it and
    /// the successor get fresh heights but are not rotated, so an imbalance can remain among them.
    ///
    /// Returns [`Miss::EmptyTree`] or [`Miss::KeyNotFound`] if there is nothing to delete. A
    /// missing key still rebalances the path walked toward it, and the [`DeleteMiss`] carries
    /// any rotations that pass performed.
    pub fn delete(&mut self, key: Key) -> Result<Deletion, DeleteMiss> {
        if self.root.is_none() {
            return Err(Miss::EmptyTree.into());
        }

        let mut trace = Trace::default();
        let mut slot = &mut self.root;

        loop {
            let dir = match slot.as_deref() {
                None => break,
                Some(node) => match key.cmp(&node.key) {
                    Ordering::Less => Dir::Left,
                    Ordering::Equal => break,
                    Ordering::Greater => Dir::Right,
                },
            };

            trace.descend(dir);
            slot = descend(slot, dir);
        }

        let Some(mut target) = slot.take() else {
            // No edit was made, but the walked path may hold an imbalance left behind by an
            // earlier two-children deletion.
            let rotations = self.rebalance(trace);
            return Err(DeleteMiss {
                miss: Miss::KeyNotFound(key),
                rotations,
            });
        };

        let case = match (target.take_child(Dir::Left), target.take_child(Dir::Right)) {
            (None, None) => DeleteCase::Leaf,

            (Some(child), None) | (None, Some(child)) => {
                *slot = Some(child);
                DeleteCase::OneChild
            }

            (Some(left), Some(right)) => {
                let direct = right.child(Dir::Left).is_none();
                let (successor, rest) = split_min(right);

                target.key = successor.key;
                target.set_child(Dir::Left, Some(left));
                target.set_child(Dir::Right, rest);
                target.update_height();
                *slot = Some(target);

                // The overwritten node is the deepest entry of the trace.
                trace.visit();

                DeleteCase::TwoChildren {
                    successor: successor.key,
                    direct,
                }
            }
        };

        self.len -= 1;

        tracing::debug!(key, ?case, "deleted");

        let rotations = self.rebalance(trace);
        Ok(Deletion { case, rotations })
    }

    // Walks `trace` from the edit toward the root, refreshing heights and rotating every
    // unbalanced node through the slot that owns it.
    fn rebalance(&mut self, mut trace: Trace) -> Vec<Rotated> {
        let mut rotations = Vec::new();

        while let Some(path) = trace.pop() {
            let slot = self.slot_mut(path);
            let Some(node) = slot.as_deref_mut() else {
                continue;
            };

            node.update_height();

            let Some(rotation) = Rotation::classify(node) else {
                continue;
            };

            let pivot = node.key;
            tracing::debug!(%rotation, pivot, "rotating");

            rotation.apply(slot);
            rotations.push(Rotated { rotation, pivot });
        }

        rotations
    }

    // Returns the slot reached by following `path` from the root.
    fn slot_mut(&mut self, path: &[Dir]) -> &mut Link {
        path.iter()
            .fold(&mut self.root, |slot, &dir| descend(slot, dir))
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut count = 0;

        if let Some(root) = self.root.as_deref() {
            Self::assert_invariants_at(root, None, None, &mut count);
        }

        assert_eq!(count, self.len, "len does not match the number of nodes");
    }

    fn assert_invariants_at(
        node: &Node,
        lower: Option<Key>,
        upper: Option<Key>,
        count: &mut usize,
    ) {
        if let Some(lower) = lower {
            assert!(node.key > lower, "{} is out of order under {lower}", node.key);
        }

        if let Some(upper) = upper {
            assert!(node.key < upper, "{} is out of order under {upper}", node.key);
        }

        assert_eq!(
            node.height,
            balance::recompute_height(node),
            "cached height of {} is stale",
            node.key
        );

        *count += 1;

        if let Some(left) = node.child(Dir::Left) {
            Self::assert_invariants_at(left, lower, Some(node.key), count);
        }

        if let Some(right) = node.child(Dir::Right) {
            Self::assert_invariants_at(right, Some(node.key), upper, count);
        }
    }

    /// Returns `true` if every node satisfies `|bf| <= 1`, recomputing heights from scratch.
    pub fn is_balanced(&self) -> bool {
        balance::is_balanced(&self.root)
    }

    #[doc(hidden)]
    pub fn assert_balanced(&self) {
        assert!(self.is_balanced(), "tree is not height-balanced");
    }
}

impl Drop for AvlTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'tree> IntoIterator for &'tree AvlTree {
    type Item = Key;
    type IntoIter = Iter<'tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Key> for AvlTree {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
        for key in keys {
            let _ = self.insert(key);
        }
    }
}

impl FromIterator<Key> for AvlTree {
    fn from_iter<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(keys);
        tree
    }
}

fn descend(slot: &mut Link, dir: Dir) -> &mut Link {
    match slot {
        Some(node) => &mut node.children[dir as usize],
        None => unreachable!("trace leads past an empty slot"),
    }
}

// Detaches the minimum node of the subtree rooted at `node`.
//
// Returns the minimum node and what remains of the subtree. Heights along the left spine are
// refreshed, but nothing is rebalanced.
fn split_min(mut node: Box<Node>) -> (Box<Node>, Link) {
    match node.take_child(Dir::Left) {
        None => {
            let rest = node.take_child(Dir::Right);
            node.update_height();
            (node, rest)
        }

        Some(left) => {
            let (min, rest) = split_min(left);
            node.set_child(Dir::Left, rest);
            node.update_height();
            (min, Some(node))
        }
    }
}

impl Node {
    fn leaf(key: Key) -> Box<Node> {
        Box::new(Node {
            key,
            height: 1,
            children: [None, None],
        })
    }

    #[inline]
    pub(crate) fn key(&self) -> Key {
        self.key
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    #[inline]
    fn child(&self, dir: Dir) -> Option<&Node> {
        self.children[dir as usize].as_deref()
    }

    #[inline]
    fn take_child(&mut self, dir: Dir) -> Link {
        self.children[dir as usize].take()
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }
}
