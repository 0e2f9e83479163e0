use core::fmt;

use crate::{Dir, Key, Link, Node};

/// One of the four AVL rotations.
///
/// Variants are named after the direction the unbalanced node moves; [`Rotation::imbalance`]
/// gives the classic name of the imbalance each one repairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Single right rotation, repairing an LL imbalance.
    Right,
    /// Single left rotation, repairing an RR imbalance.
    Left,
    /// Left-right double rotation, repairing an LR imbalance.
    LeftRight,
    /// Right-left double rotation, repairing an RL imbalance.
    RightLeft,
}

/// A rotation performed while rebalancing, together with the key of the node it was applied to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rotated {
    pub rotation: Rotation,
    pub pivot: Key,
}

impl Rotation {
    /// Returns the name of the imbalance this rotation repairs.
    pub const fn imbalance(self) -> &'static str {
        match self {
            Rotation::Right => "LL",
            Rotation::Left => "RR",
            Rotation::LeftRight => "LR",
            Rotation::RightLeft => "RL",
        }
    }

    // Picks the rotation that repairs `node`, if it needs one.
    //
    // A heavy child with a balance factor of 0 gets a single rotation.
    pub(crate) fn classify(node: &Node) -> Option<Rotation> {
        let factor = node.balance_factor();

        if factor >= 2 {
            let heavy = node.child(Dir::Left)?;

            Some(if heavy.balance_factor() >= 0 {
                Rotation::Right
            } else {
                Rotation::LeftRight
            })
        } else if factor <= -2 {
            let heavy = node.child(Dir::Right)?;

            Some(if heavy.balance_factor() <= 0 {
                Rotation::Left
            } else {
                Rotation::RightLeft
            })
        } else {
            None
        }
    }

    // Applies the rotation to the node owned by `slot`.
    //
    // `slot` is the matching child slot of the node's parent, or the root slot of the tree if the
    // node has no parent. The new local root is written back into it.
    pub(crate) fn apply(self, slot: &mut Link) {
        match self {
            Rotation::Right => rotate_at(slot, Dir::Left),
            Rotation::Left => rotate_at(slot, Dir::Right),
            Rotation::LeftRight => rotate_twice_at(slot, Dir::Left),
            Rotation::RightLeft => rotate_twice_at(slot, Dir::Right),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.imbalance())
    }
}

// Performs a single rotation, moving the `heavy` child of the node in `slot` up and the node
// itself down.
//
// `up`'s `!heavy` subtree moves across to become `down`'s `heavy` subtree. The heights of `down`
// and `up` are refreshed in that order.
fn rotate_at(slot: &mut Link, heavy: Dir) {
    let Some(mut down) = slot.take() else {
        return;
    };

    let Some(mut up) = down.take_child(heavy) else {
        debug_assert!(false, "rotating {} without a {heavy:?} child", down.key);
        *slot = Some(down);
        return;
    };

    down.set_child(heavy, up.take_child(!heavy));
    down.update_height();

    up.set_child(!heavy, Some(down));
    up.update_height();

    *slot = Some(up);
}

// Performs a double rotation at the node in `slot`, moving the `!heavy` child of its `heavy`
// child up two levels.
//
// For `heavy == Left` (an LR imbalance), with `n` the node in `slot`, `child = n.left` and
// `grand = child.right`:
//
// - `child.right = grand.left`
// - `grand.left = child`
// - `n.left = grand.right`
// - `grand.right = n`
//
// and `grand` replaces `n` in `slot`. `heavy == Right` is the mirror image.
fn rotate_twice_at(slot: &mut Link, heavy: Dir) {
    let Some(mut down_second) = slot.take() else {
        return;
    };

    let Some(mut down_first) = down_second.take_child(heavy) else {
        debug_assert!(false, "rotating {} without a {heavy:?} child", down_second.key);
        *slot = Some(down_second);
        return;
    };

    let Some(mut up) = down_first.take_child(!heavy) else {
        debug_assert!(false, "rotating {} without a grandchild", down_second.key);
        down_second.set_child(heavy, Some(down_first));
        *slot = Some(down_second);
        return;
    };

    down_first.set_child(!heavy, up.take_child(heavy));
    down_second.set_child(heavy, up.take_child(!heavy));

    down_first.update_height();
    down_second.update_height();

    up.set_child(heavy, Some(down_first));
    up.set_child(!heavy, Some(down_second));
    up.update_height();

    *slot = Some(up);
}
