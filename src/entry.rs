//! Chain nodes stored in the arena, and the detached `Mapping` handed out by
//! `HashTable::entries`.

use core::fmt;
use core::hash::{Hash, Hasher};
use slotmap::DefaultKey;

/// One node of a bucket chain.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Computed once at insertion; growth reuses it instead of rehashing.
    pub(crate) hash: u64,
    /// Bucket this node is linked into. Diagnostic only.
    pub(crate) bucket: usize,
    pub(crate) next: Option<DefaultKey>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64, bucket: usize) -> Self {
        Self {
            key,
            value,
            hash,
            bucket,
            next: None,
        }
    }
}

/// A key-value pair copied out of a table.
///
/// `Mapping`s are snapshots: they share nothing with the table they came
/// from. Equality and hashing consider the key and the value only, so a
/// mapping built with [`Mapping::new`] compares equal to one produced by
/// [`HashTable::entries`](crate::HashTable::entries) for the same pair.
#[derive(Clone, Debug)]
pub struct Mapping<K, V> {
    key: K,
    value: V,
    bucket: Option<usize>,
}

impl<K, V> Mapping<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            bucket: None,
        }
    }

    pub(crate) fn from_entry(entry: &Entry<K, V>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self {
            key: entry.key.clone(),
            value: entry.value.clone(),
            bucket: Some(entry.bucket),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Bucket the pair occupied when the snapshot was taken; `None` for
    /// mappings built by callers.
    pub fn bucket(&self) -> Option<usize> {
        self.bucket
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Mapping<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: Eq, V: Eq> Eq for Mapping<K, V> {}

impl<K: Hash, V: Hash> Hash for Mapping<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Mapping<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    /// Invariant: the recorded bucket does not take part in equality or hashing.
    #[test]
    fn bucket_is_ignored_by_eq_and_hash() {
        let node = Entry::new("k".to_string(), 1, 0, 7);
        let snap = Mapping::from_entry(&node);
        let built = Mapping::new("k".to_string(), 1);
        assert_eq!(snap.bucket(), Some(7));
        assert_eq!(built.bucket(), None);
        assert_eq!(snap, built);
        assert_eq!(hash_of(&snap), hash_of(&built));
    }

    #[test]
    fn different_values_are_not_equal() {
        assert_ne!(Mapping::new("k", 1), Mapping::new("k", 2));
        assert_ne!(Mapping::new("a", 1), Mapping::new("b", 1));
    }

    #[test]
    fn display_renders_key_equals_value() {
        assert_eq!(Mapping::new("0", "101").to_string(), "0=101");
        assert_eq!(Mapping::new(3, 4).into_pair(), (3, 4));
    }
}
