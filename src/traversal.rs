//! Traversal: forward-only cursor over buckets, then chains.
//!
//! The cursor yields entries in bucket order and, within a bucket, in chain
//! order. It is the single code path used to build the key, value and entry
//! snapshots and to collect nodes when the bucket array grows.

use crate::entry::Entry;
use core::iter::FusedIterator;
use slotmap::{DefaultKey, SlotMap};
use thiserror::Error;

/// Failure reported by the explicit traversal protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TraversalError {
    /// `try_next` was called after the last entry had been yielded.
    #[error("no more elements in traversal")]
    Exhausted,
}

/// Cursor over the entries of a [`HashTable`](crate::HashTable).
///
/// Use `has_next`/`try_next` for the explicit protocol, where advancing an
/// exhausted cursor is an error, or the `Iterator` impl, which simply ends.
pub struct Traversal<'a, K, V> {
    buckets: &'a [Option<DefaultKey>],
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    // Next bucket to scan once the current chain ends.
    index: usize,
    next: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Traversal<'a, K, V> {
    pub(crate) fn new(
        buckets: &'a [Option<DefaultKey>],
        slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    ) -> Self {
        let mut t = Self {
            buckets,
            slots,
            index: 0,
            next: None,
            remaining: slots.len(),
        };
        t.next = t.scan_buckets();
        t
    }

    fn scan_buckets(&mut self) -> Option<DefaultKey> {
        while self.index < self.buckets.len() {
            let head = self.buckets[self.index];
            self.index += 1;
            if head.is_some() {
                return head;
            }
        }
        None
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Yield the next node together with its arena key.
    pub(crate) fn advance(&mut self) -> Result<(DefaultKey, &'a Entry<K, V>), TraversalError> {
        let k = self.next.ok_or(TraversalError::Exhausted)?;
        let slots = self.slots;
        let entry = &slots[k];
        self.next = match entry.next {
            Some(n) => Some(n),
            None => self.scan_buckets(),
        };
        self.remaining = self.remaining.saturating_sub(1);
        Ok((k, entry))
    }

    pub(crate) fn next_entry(&mut self) -> Result<&'a Entry<K, V>, TraversalError> {
        self.advance().map(|(_, e)| e)
    }

    /// Yield the next key/value pair, or `Exhausted` once every entry was seen.
    pub fn try_next(&mut self) -> Result<(&'a K, &'a V), TraversalError> {
        self.next_entry().map(|e| (&e.key, &e.value))
    }
}

impl<'a, K, V> Iterator for Traversal<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Traversal<'_, K, V> {}

impl<K, V> FusedIterator for Traversal<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashTable;
    use std::hash::BuildHasher;

    #[derive(Clone, Default)]
    struct IdentityBuildHasher;
    struct IdentityHasher(u64);
    impl BuildHasher for IdentityBuildHasher {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }
    impl std::hash::Hasher for IdentityHasher {
        fn write(&mut self, _bytes: &[u8]) {
            unreachable!("only u64 keys are used")
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    /// Invariant: an empty table yields nothing and the first `try_next` fails.
    #[test]
    fn empty_traversal_is_exhausted() {
        let t: HashTable<String, i32> = HashTable::new();
        let mut cur = t.traverse();
        assert!(!cur.has_next());
        assert_eq!(cur.try_next(), Err(TraversalError::Exhausted));
        assert_eq!(cur.len(), 0);
    }

    /// Invariant: advancing past the end is a distinct error, repeatedly, and
    /// never yields a stale element.
    #[test]
    fn exhausted_cursor_keeps_failing() {
        let mut t: HashTable<&str, i32> = HashTable::new();
        t.put("only", 1);
        let mut cur = t.traverse();
        assert_eq!(cur.try_next(), Ok((&"only", &1)));
        assert!(!cur.has_next());
        assert_eq!(cur.try_next(), Err(TraversalError::Exhausted));
        assert_eq!(cur.try_next(), Err(TraversalError::Exhausted));
        assert_eq!(cur.next(), None);
        assert_eq!(
            TraversalError::Exhausted.to_string(),
            "no more elements in traversal"
        );
    }

    /// Invariant: order is bucket ascending, then chain order (insertion order
    /// within a chain), and empty buckets are skipped.
    #[test]
    fn yields_bucket_then_chain_order() {
        let mut t: HashTable<u64, &str, IdentityBuildHasher> =
            HashTable::with_hasher(IdentityBuildHasher);
        // Capacity 16: 3 and 19 share bucket 3, 35 too; 1 lands in bucket 1.
        t.put(19, "b");
        t.put(3, "a");
        t.put(14, "d");
        t.put(1, "z");
        t.put(35, "c");
        let order: Vec<u64> = t.traverse().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![1, 19, 3, 35, 14]);
    }

    /// Invariant: `size_hint` is exact and shrinks with each step.
    #[test]
    fn size_hint_tracks_remaining() {
        let mut t: HashTable<i32, i32> = HashTable::new();
        for i in 0..40 {
            t.put(i, i);
        }
        let mut cur = t.traverse();
        assert_eq!(cur.len(), 40);
        for seen in 1..=40 {
            assert!(cur.has_next());
            cur.try_next().expect("entry available");
            assert_eq!(cur.len(), 40 - seen);
        }
        assert!(!cur.has_next());
    }
}
