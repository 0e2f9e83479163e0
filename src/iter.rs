use core::iter::FusedIterator;

use crate::{AvlTree, Dir, Key, Node};

/// An in-order iterator over the keys of an [`AvlTree`].
///
/// Created by [`AvlTree::iter`].
pub struct Iter<'tree> {
    // Nodes whose left subtree has been entered but which have not been yielded yet.
    stack: Vec<&'tree Node>,
    len: usize,
}

impl<'tree> Iter<'tree> {
    pub(crate) fn new(tree: &'tree AvlTree) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            len: tree.len(),
        };

        iter.push_left_spine(tree.root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut opt_cur: Option<&'tree Node>) {
        while let Some(cur) = opt_cur {
            self.stack.push(cur);
            opt_cur = cur.child(Dir::Left);
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        // The left subtree of `cur` has been exhausted; its right subtree is up next.
        self.push_left_spine(cur.child(Dir::Right));
        self.len -= 1;

        Some(cur.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// An in-order iterator over the keys of an [`AvlTree`] that fall in an inclusive range.
///
/// Created by [`AvlTree::range`]. Subtrees entirely below the range are never entered, and
/// iteration stops at the first key above it.
pub struct Range<'tree> {
    stack: Vec<&'tree Node>,
    low: Key,
    high: Key,
}

impl<'tree> Range<'tree> {
    pub(crate) fn new(tree: &'tree AvlTree, low: Key, high: Key) -> Self {
        let mut range = Range {
            stack: Vec::new(),
            low,
            high,
        };

        if low <= high {
            range.push_left_spine(tree.root.as_deref());
        }

        range
    }

    // Like `Iter::push_left_spine`, but steps right past every node below `low` instead of
    // stacking it.
    fn push_left_spine(&mut self, mut opt_cur: Option<&'tree Node>) {
        while let Some(cur) = opt_cur {
            if cur.key < self.low {
                opt_cur = cur.child(Dir::Right);
            } else {
                self.stack.push(cur);
                opt_cur = cur.child(Dir::Left);
            }
        }
    }
}

impl Iterator for Range<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        if cur.key > self.high {
            // Every remaining key is greater still.
            self.stack.clear();
            return None;
        }

        self.push_left_spine(cur.child(Dir::Right));

        Some(cur.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

impl FusedIterator for Range<'_> {}
