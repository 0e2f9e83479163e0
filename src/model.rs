use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, DeleteCase, Deletion, Key, Miss};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(Key),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i64..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Delete(ItemValue),
    Search(ItemValue),
    RangeSearch(ItemValue, u8),
    Initialize,
}

impl Op {
    fn finalize(self, sorted: &[Key]) -> FinalOp {
        fn get_value(v: &[Key], i: ItemValue) -> Key {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as Key
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Delete(item) => FinalOp::Delete(get_value(sorted, item)),
            Op::Search(item) => FinalOp::Search(get_value(sorted, item)),
            Op::RangeSearch(item, width) => {
                let low = get_value(sorted, item);
                FinalOp::RangeSearch(low, low.saturating_add(width.into()))
            }
            Op::Initialize => FinalOp::Initialize,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(Key),
    Delete(Key),
    Search(Key),
    RangeSearch(Key, Key),
    Initialize,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        3 => value_strategy().prop_map(Op::Delete),
        2 => value_strategy().prop_map(Op::Search),
        1 => (value_strategy(), 0u8..64).prop_map(|(item, width)| Op::RangeSearch(item, width)),
        1 => Just(Op::Initialize),
    ]
}

/// Returns `true` if `deletion` may have left an imbalance among the successor's ancestors.
pub fn may_unbalance(deletion: &Deletion) -> bool {
    matches!(
        deletion.case,
        DeleteCase::TwoChildren { direct: false, .. }
    )
}

/// Runs `ops` against both an [`AvlTree`] and a [`BTreeSet`], asserting that they agree after
/// every operation.
///
/// The AVL property is asserted until the first deletion that may leave an imbalance behind, and
/// again after every `Initialize`.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut tree = AvlTree::new();
    let mut balanced = true;

    fn insert_sorted(v: &mut Vec<Key>, value: Key) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<Key>, value: Key) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = if btree.insert(value) {
                    None
                } else {
                    Some(Miss::DuplicateKey(value))
                };
                let from_tree = tree.insert(value).err();

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Delete(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = if btree.is_empty() {
                    Some(Miss::EmptyTree)
                } else if btree.remove(&value) {
                    None
                } else {
                    Some(Miss::KeyNotFound(value))
                };

                let from_tree = match tree.delete(value) {
                    Ok(deletion) => {
                        balanced &= !may_unbalance(&deletion);
                        None
                    }
                    Err(missed) => Some(missed.miss),
                };

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(value) => {
                let from_btree = if btree.is_empty() {
                    Err(Miss::EmptyTree)
                } else {
                    btree.get(&value).copied().ok_or(Miss::KeyNotFound(value))
                };

                assert_eq!(from_btree, tree.search(value), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::RangeSearch(low, high) => {
                let from_btree: Vec<Key> = btree.range(low..=high).copied().collect();
                let from_tree: Vec<Key> = tree.range(low, high).collect();

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Initialize => {
                sorted_values.clear();
                btree.clear();
                tree.clear();
                balanced = true;
            }
        }

        tree.assert_invariants();
        if balanced {
            tree.assert_balanced();
        }

        assert_eq!(btree.len(), tree.len());
        assert!(btree.iter().copied().eq(tree.iter()));
    }
}
