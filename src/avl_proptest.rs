#![cfg(test)]

// Property tests for AvlTree kept inside the crate next to the engine they
// check; `validate` is public but these exercise the rebalancing paths far
// more densely than the integration tests do.

use crate::avl::{AvlTree, Order};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16),
    Replace(u16),
    Remove(u16),
    Get(u16),
    Traverse,
}

// Small key space so removes and duplicates hit often.
fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..64;
    let op = prop_oneof![
        3 => key.clone().prop_map(Op::Insert),
        1 => key.clone().prop_map(Op::Replace),
        2 => key.clone().prop_map(Op::Remove),
        1 => key.prop_map(Op::Get),
        1 => Just(Op::Traverse),
    ];
    proptest::collection::vec(op, 1..200)
}

/// Smallest possible height bound for an AVL tree with `n` nodes:
/// `h < 1.4405 * log2(n + 2)`.
fn avl_height_bound(n: usize) -> i32 {
    (1.4405 * ((n + 2) as f64).log2()).floor() as i32
}

// Property: state-machine equivalence against BTreeSet.
// After every op:
// - `validate` holds (order, cached heights, balance factors, reachability);
// - `len` matches the model and the height stays within the AVL bound;
// - in-order traversal equals the model's sorted contents.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_btreeset(ops in arb_ops()) {
        let mut sut: AvlTree<u16> = AvlTree::new();
        let mut model: BTreeSet<u16> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    prop_assert_eq!(sut.insert(k), model.insert(k));
                }
                Op::Replace(k) => {
                    let had = model.contains(&k);
                    model.insert(k);
                    prop_assert_eq!(sut.replace(k), had.then_some(k));
                }
                Op::Remove(k) => {
                    let expected = model.remove(&k).then_some(k);
                    prop_assert_eq!(sut.remove(&k), expected);
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.contains(&k), model.contains(&k));
                }
                Op::Traverse => {
                    let mut seen = Vec::new();
                    sut.traverse(Order::In, |v| seen.push(*v));
                    let expected: Vec<u16> = model.iter().copied().collect();
                    prop_assert_eq!(seen, expected);
                }
            }

            prop_assert!(sut.validate());
            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.height() <= avl_height_bound(sut.len()));
            prop_assert_eq!(sut.min(), model.first());
            prop_assert_eq!(sut.max(), model.last());
        }
    }
}

// Property: pre- and post-order visit every element exactly once, and the
// first pre-order / last post-order element is the same root.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_traversals_visit_each_once(keys in proptest::collection::vec(any::<i32>(), 1..100)) {
        let sut: AvlTree<i32> = keys.iter().copied().collect();
        let mut pre = Vec::new();
        let mut post = Vec::new();
        sut.traverse(Order::Pre, |v| pre.push(*v));
        sut.traverse(Order::Post, |v| post.push(*v));
        prop_assert_eq!(pre.len(), sut.len());
        prop_assert_eq!(post.len(), sut.len());
        prop_assert_eq!(pre.first(), post.last());
        let pre_set: BTreeSet<i32> = pre.into_iter().collect();
        let key_set: BTreeSet<i32> = keys.into_iter().collect();
        prop_assert_eq!(pre_set, key_set);
    }
}
