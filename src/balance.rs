use crate::{Dir, Link, Node};

/// Returns the cached height of the subtree in `link`.
#[inline]
pub(crate) fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

impl Node {
    /// Refreshes the cached height from the cached heights of the children.
    #[inline]
    pub(crate) fn update_height(&mut self) {
        let [left, right] = &self.children;
        self.height = 1 + height(left).max(height(right));
    }

    /// Returns `h(left) - h(right)` from the cached heights.
    #[inline]
    pub(crate) fn balance_factor(&self) -> i32 {
        let [left, right] = &self.children;
        height(left) as i32 - height(right) as i32
    }
}

/// Computes the height of the subtree rooted at `node` without consulting any cache.
pub(crate) fn recompute_height(node: &Node) -> u32 {
    if node.is_leaf() {
        return 1;
    }

    let left = node.child(Dir::Left).map_or(0, recompute_height);
    let right = node.child(Dir::Right).map_or(0, recompute_height);

    1 + left.max(right)
}

/// Computes the balance factor of `node` without consulting any cache.
pub(crate) fn recompute_balance_factor(node: &Node) -> i32 {
    let left = node.child(Dir::Left).map_or(0, recompute_height);
    let right = node.child(Dir::Right).map_or(0, recompute_height);

    left as i32 - right as i32
}

pub(crate) fn is_balanced(link: &Link) -> bool {
    let Some(node) = link.as_deref() else {
        return true;
    };

    recompute_balance_factor(node).abs() <= 1
        && node.children.iter().all(is_balanced)
}
