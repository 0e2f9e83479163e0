use thiserror::Error;

use crate::{Key, Rotated};

/// A tree operation that had nothing to act on.
///
/// A missed search or insert leaves the tree as it was. A missed delete may not: see
/// [`DeleteMiss`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Miss {
    #[error("key {0} is already present")]
    DuplicateKey(Key),

    #[error("key {0} not found")]
    KeyNotFound(Key),

    #[error("tree is empty")]
    EmptyTree,
}

/// A delete that found no key to remove.
///
/// The path walked toward the missing key is still rebalanced. It is normally balanced already,
/// but an imbalance left behind by an earlier two-children deletion is repaired here.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{miss}")]
pub struct DeleteMiss {
    pub miss: Miss,
    /// Rotations performed on the walked path, nearest the missing key first.
    pub rotations: Vec<Rotated>,
}

impl From<Miss> for DeleteMiss {
    fn from(miss: Miss) -> Self {
        DeleteMiss {
            miss,
            rotations: Vec::new(),
        }
    }
}
