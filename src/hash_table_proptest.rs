#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can inspect the
// bucket array and arena directly.

use crate::hash_table::{bucket_index, HashTable};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Keys,
    Values,
    Entries,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => Just(OpI::Keys),
            1 => Just(OpI::Values),
            1 => Just(OpI::Entries),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural invariants checked after every operation.
fn check_structure<V, S>(sut: &HashTable<Key, V, S>) -> Result<(), TestCaseError> {
    let capacity = sut.buckets.len();
    prop_assert!(capacity.is_power_of_two());
    prop_assert!(capacity <= crate::MAX_CAPACITY);
    let mut reached = 0usize;
    for (b, head) in sut.buckets.iter().enumerate() {
        let mut seen = BTreeSet::new();
        let mut cursor = *head;
        while let Some(k) = cursor {
            let e = &sut.slots[k];
            prop_assert_eq!(bucket_index(e.hash, capacity), b);
            prop_assert!(seen.insert(e.key.clone()), "duplicate key in chain");
            reached += 1;
            cursor = e.next;
        }
    }
    prop_assert_eq!(reached, sut.slots.len(), "every node is linked exactly once");
    Ok(())
}

fn run_state_machine<S: BuildHasher>(
    mut sut: HashTable<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = key_from(&pool, i);
                let before = sut.len();
                let prev = sut.put(k.clone(), v);
                let mprev = model.insert(k, v);
                prop_assert_eq!(prev, mprev);
                let grew = if mprev.is_some() { 0 } else { 1 };
                prop_assert_eq!(sut.len(), before + grew);
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let removed = sut.remove(k.0.as_str());
                prop_assert_eq!(removed, model.remove(&k));
                prop_assert!(sut.get(k.0.as_str()).is_none());
            }
            OpI::Get(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Keys => {
                let mut s_keys: Vec<_> = sut.keys().into_iter().collect();
                s_keys.sort();
                let m_keys: Vec<_> = model.keys().cloned().collect::<BTreeSet<_>>().into_iter().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Values => {
                let mut s_vals = sut.values();
                s_vals.sort();
                let mut m_vals: Vec<_> = model.values().copied().collect();
                m_vals.sort();
                prop_assert_eq!(s_vals, m_vals);
            }
            OpI::Entries => {
                let s_entries: BTreeMap<_, _> =
                    sut.entries().into_iter().map(|m| m.into_pair()).collect();
                let m_entries: BTreeMap<_, _> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_entries, m_entries);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.traverse().count(), model.len());
        check_structure(&sut)?;
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the prior value exactly when the model had one; len grows by
//   one only for new keys.
// - `remove` returns the model's value and physically unlinks the node.
// - Snapshots agree with the model's keys, values and pairs.
// - Every node is reachable from exactly one bucket chosen by its hash, and
//   chains hold distinct keys, across any number of growths.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(HashTable::new(), pool, ops)?;
    }
}

// Small initial capacity so growth happens early and often.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_from_one_bucket((pool, ops) in arb_scenario()) {
        run_state_machine(HashTable::with_capacity(1), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every key shares one chain, so this
// stresses head, middle and tail removal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(HashTable::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Hasher that spreads keys over the whole u64 range, so half of all hashes
// read as negative when reduced to a bucket.
#[derive(Clone, Default)]
struct SignedBuildHasher;
struct SignedHasher(u64);
impl BuildHasher for SignedBuildHasher {
    type Hasher = SignedHasher;
    fn build_hasher(&self) -> Self::Hasher {
        SignedHasher(0xcbf2_9ce4_8422_2325)
    }
}
impl Hasher for SignedHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= *b as u64;
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_signed_hashes((pool, ops) in arb_scenario()) {
        run_state_machine(HashTable::with_hasher(SignedBuildHasher), pool, ops)?;
    }
}

