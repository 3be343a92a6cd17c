//! HashTable: bucket array of chain heads over an arena of chain nodes.

use crate::entry::Entry;
use crate::traversal::Traversal;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use tracing::debug;

/// Bucket count of a table built with [`HashTable::new`].
pub const DEFAULT_CAPACITY: usize = 1 << 4;

/// Upper bound on the bucket count. Larger requests are clamped.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Reduce a hash to a bucket index.
///
/// The hash is read as a signed value and the absolute value of the
/// remainder is taken, so a negative reading lands in `[0, capacity)` too.
/// For non-negative readings this equals `hash & (capacity - 1)`.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two() && capacity <= MAX_CAPACITY);
    ((hash as i64) % (capacity as i64)).unsigned_abs() as usize
}

fn clamp_capacity(requested: usize) -> usize {
    requested.clamp(1, MAX_CAPACITY).next_power_of_two()
}

/// A separately chained hash table.
///
/// Each bucket holds the head of a singly linked chain; nodes live in a
/// `SlotMap` arena and link to their successor by arena key. The bucket
/// array doubles once `len / capacity` exceeds 0.75, up to
/// [`MAX_CAPACITY`].
///
/// `keys`, `values` and `entries` return detached snapshots: changing a
/// snapshot never changes the table and changing the table never changes a
/// snapshot already taken.
pub struct HashTable<K, V, S = RandomState> {
    hasher: S,
    pub(crate) buckets: Vec<Option<DefaultKey>>,
    pub(crate) slots: SlotMap<DefaultKey, Entry<K, V>>, // chain nodes, linked by key
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Create a table with at least `capacity` buckets, rounded up to a power
    /// of two and clamped to `[1, MAX_CAPACITY]`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: vec![None; clamp_capacity(capacity)],
            slots: SlotMap::with_key(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Associate `value` with `key`.
    ///
    /// Returns the value previously stored under `key`, or `None` when the
    /// key is new. New keys are appended at the tail of their chain. May
    /// grow the bucket array afterwards.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let previous = self.put_hashed(hash, key, value);
        if self.needs_resize() {
            self.resize();
        }
        previous
    }

    fn put_hashed(&mut self, hash: u64, key: K, value: V) -> Option<V> {
        let bucket = bucket_index(hash, self.capacity());
        let mut tail = None;
        let mut cursor = self.buckets[bucket];
        while let Some(k) = cursor {
            let entry = &mut self.slots[k];
            if entry.hash == hash && entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
            tail = Some(k);
            cursor = entry.next;
        }
        let k = self.slots.insert(Entry::new(key, value, hash, bucket));
        self.link_after(bucket, tail, k);
        None
    }

    fn link_after(&mut self, bucket: usize, tail: Option<DefaultKey>, k: DefaultKey) {
        match tail {
            None => self.buckets[bucket] = Some(k),
            Some(t) => self.slots[t].next = Some(k),
        }
    }

    fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let mut cursor = self.buckets[bucket_index(hash, self.capacity())];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            if entry.hash == hash && entry.key.borrow() == q {
                return Some(k);
            }
            cursor = entry.next;
        }
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).map(|k| &self.slots[k].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    /// Remove the mapping for `q`, returning its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove the mapping for `q`, returning the stored key and value.
    ///
    /// The node is unlinked from its chain: a head is replaced by its
    /// successor in the bucket slot, any other node is skipped over by its
    /// predecessor.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let bucket = bucket_index(hash, self.capacity());
        let mut prev: Option<DefaultKey> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            let next = entry.next;
            if entry.hash == hash && entry.key.borrow() == q {
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.slots[p].next = next,
                }
                let removed = self.slots.remove(k)?;
                return Some((removed.key, removed.value));
            }
            prev = Some(k);
            cursor = next;
        }
        None
    }

    fn needs_resize(&self) -> bool {
        // len / capacity > 0.75, in integers.
        self.len() * 4 > self.capacity() * 3 && self.capacity() < MAX_CAPACITY
    }

    /// Double the bucket array and relink every node against it.
    ///
    /// Nodes are collected with a traversal and appended to the tail of their
    /// new chain in that order, so the result matches reinserting each pair
    /// through `put`. Cached hashes are reused and no node is reallocated.
    fn resize(&mut self) {
        let old_capacity = self.capacity();
        let capacity = (old_capacity * 2).min(MAX_CAPACITY);

        let mut order = Vec::with_capacity(self.len());
        let mut t = self.traverse();
        while let Ok((k, _)) = t.advance() {
            order.push(k);
        }

        self.buckets = vec![None; capacity];
        let mut tails: Vec<Option<DefaultKey>> = vec![None; capacity];
        for k in order {
            let entry = &mut self.slots[k];
            let bucket = bucket_index(entry.hash, capacity);
            entry.bucket = bucket;
            entry.next = None;
            self.link_after(bucket, tails[bucket], k);
            tails[bucket] = Some(k);
        }

        debug!(
            old_capacity,
            new_capacity = capacity,
            len = self.len(),
            "grew hash table bucket array"
        );
    }

    /// Start a traversal over all entries in bucket, then chain, order.
    pub fn traverse(&self) -> Traversal<'_, K, V> {
        Traversal::new(&self.buckets, &self.slots)
    }

    /// Borrowing iterator over `(key, value)`; same order as `traverse`.
    pub fn iter(&self) -> Traversal<'_, K, V> {
        self.traverse()
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Traversal<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}

impl<K, V, S> Extend<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

/// Tables are equal when they hold the same mappings, whatever their
/// capacity or chain layout.
impl<K, V, S> PartialEq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

struct ChainDebug<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    head: DefaultKey,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ChainDebug<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut cursor = Some(self.head);
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            map.entry(&entry.key, &entry.value);
            cursor = entry.next;
        }
        map.finish()
    }
}

/// Renders non-empty buckets as `{index: {key: value, ...}, ...}`.
impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, head) in self.buckets.iter().enumerate() {
            if let Some(head) = *head {
                map.entry(
                    &i,
                    &ChainDebug {
                        slots: &self.slots,
                        head,
                    },
                );
            }
        }
        map.finish()
    }
}
