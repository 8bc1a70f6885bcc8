// Table property tests (consolidated).
//
// Property: state-machine equivalence against std::collections::HashMap,
// for both backends, under a random hasher and under a constant hasher
// (every key collides).
//  - Elements are `KeyValue<String, i32>`; the model maps key -> value.
//  - Operations: insert (replace on equal key), get, remove, explicit resize.
//  - After every op: `validate()` holds, `len` matches the model, and the
//    load factor stays within one element of the 0.7 limit.
//  - At the end: every model key is found with its value, and a resize
//    keeps the exact key set.
mod common;

use avl_tables::{ChainedTable, HashIndex, KeyValue, ProbingTable};
use common::ConstBuildHasher;
use proptest::prelude::*;
use std::collections::HashMap;
use std::hash::BuildHasher;

type Entry = KeyValue<String, i32>;

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Get(usize),
    Remove(usize),
    Resize,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            3 => idx.prop_map(Op::Remove),
            1 => Just(Op::Resize),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// What both tables expose beyond the shared contract.
trait Checked: HashIndex<Entry> {
    fn check(&self) -> bool;
    fn grow(&mut self);
}

impl<S: BuildHasher> Checked for ChainedTable<Entry, S> {
    fn check(&self) -> bool {
        self.validate()
    }
    fn grow(&mut self) {
        self.resize();
    }
}

impl<S: BuildHasher> Checked for ProbingTable<Entry, S> {
    fn check(&self) -> bool {
        self.validate()
    }
    fn grow(&mut self) {
        self.resize();
    }
}

fn run<T: Checked>(mut sut: T, pool: &[String], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let key = pool[i].clone();
                let prev = model.insert(key.clone(), v);
                let replaced = sut.insert(KeyValue::new(key, v));
                prop_assert_eq!(replaced.map(|kv| kv.value), prev);
            }
            Op::Get(i) => {
                let got = sut.get(&pool[i]).map(|kv| kv.value);
                prop_assert_eq!(got, model.get(&pool[i]).copied());
            }
            Op::Remove(i) => {
                let removed = sut.remove(&pool[i]);
                let expected = model.remove(&pool[i]);
                prop_assert_eq!(removed.as_ref().map(|kv| kv.value), expected);
                if let Some(kv) = removed {
                    prop_assert_eq!(&kv.key, &pool[i]);
                }
            }
            Op::Resize => {
                let capacity = sut.capacity();
                sut.grow();
                prop_assert_eq!(sut.capacity(), capacity * 2);
            }
        }

        prop_assert!(sut.check());
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // At most one element past the 0.7 limit, checked in integers.
        prop_assert!(sut.len() * 10 <= sut.capacity() * 7 + 10);
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k).map(|kv| kv.value), Some(*v));
    }
    sut.grow();
    for key in pool {
        prop_assert_eq!(sut.contains(key), model.contains_key(key));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_chained_matches_hashmap((pool, ops) in arb_scenario(), capacity in 1usize..8) {
        run(ChainedTable::<Entry, _>::with_capacity(capacity).unwrap(), &pool, ops)?;
    }

    #[test]
    fn prop_probing_matches_hashmap((pool, ops) in arb_scenario(), capacity in 1usize..8) {
        run(ProbingTable::<Entry, _>::with_capacity(capacity).unwrap(), &pool, ops)?;
    }

    #[test]
    fn prop_chained_with_collisions((pool, ops) in arb_scenario()) {
        run(ChainedTable::<Entry, _>::with_capacity_and_hasher(2, ConstBuildHasher).unwrap(), &pool, ops)?;
    }

    #[test]
    fn prop_probing_with_collisions((pool, ops) in arb_scenario()) {
        run(ProbingTable::<Entry, _>::with_capacity_and_hasher(2, ConstBuildHasher).unwrap(), &pool, ops)?;
    }
}
