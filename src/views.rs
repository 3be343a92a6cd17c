//! Detached snapshots of a table's keys, values and mappings.
//!
//! Each view runs one full traversal and copies what it sees into an owned
//! collection. The returned collections do not alias the table: editing one
//! leaves the table untouched, and later edits to the table do not show up in
//! a snapshot already taken. Do not turn these into live views.

use crate::entry::Mapping;
use crate::hash_table::HashTable;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashSet;

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Copy of every key.
    pub fn keys(&self) -> HashSet<K>
    where
        K: Clone,
    {
        let mut keys = HashSet::with_capacity(self.len());
        let mut t = self.traverse();
        while let Ok(entry) = t.next_entry() {
            keys.insert(entry.key.clone());
        }
        keys
    }

    /// Copy of every value, in traversal order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut values = Vec::with_capacity(self.len());
        let mut t = self.traverse();
        while let Ok(entry) = t.next_entry() {
            values.push(entry.value.clone());
        }
        values
    }

    /// Copy of every key-value pair, tagged with its current bucket.
    pub fn entries(&self) -> HashSet<Mapping<K, V>>
    where
        K: Clone,
        V: Clone + Eq + Hash,
    {
        let mut entries = HashSet::with_capacity(self.len());
        let mut t = self.traverse();
        while let Ok(entry) = t.next_entry() {
            entries.insert(Mapping::from_entry(entry));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use crate::{HashTable, Mapping};

    fn table(n: usize) -> HashTable<String, String> {
        (0..n).map(|i| (i.to_string(), i.to_string())).collect()
    }

    /// Invariant: |keys| == |entries| == |values| == len.
    #[test]
    fn cardinalities_match_len() {
        let t = table(300);
        assert_eq!(t.keys().len(), 300);
        assert_eq!(t.values().len(), 300);
        assert_eq!(t.entries().len(), 300);
    }

    #[test]
    fn views_of_empty_table_are_empty() {
        let t = table(0);
        assert!(t.keys().is_empty());
        assert!(t.values().is_empty());
        assert!(t.entries().is_empty());
    }

    /// Invariant: values come out in the same order as the traversal.
    #[test]
    fn values_follow_traversal_order() {
        let t = table(64);
        let walked: Vec<String> = t.iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(t.values(), walked);
    }

    /// Invariant: each mapping records the bucket its node lived in.
    #[test]
    fn entries_record_bucket() {
        let t = table(40);
        for m in t.entries() {
            let b = m.bucket().expect("snapshot carries a bucket");
            assert!(b < t.capacity());
        }
        assert!(t
            .entries()
            .contains(&Mapping::new("7".to_string(), "7".to_string())));
    }

    /// Invariant: a snapshot is frozen at the time it was taken.
    #[test]
    fn table_changes_do_not_reach_snapshots() {
        let mut t = table(10);
        let keys = t.keys();
        let values = t.values();
        let entries = t.entries();
        t.put("3".to_string(), "changed".to_string());
        t.remove("4");
        t.put("new".to_string(), "new".to_string());
        assert_eq!(keys.len(), 10);
        assert!(keys.contains("4"));
        assert!(!keys.contains("new"));
        assert!(values.contains(&"3".to_string()));
        assert!(!values.contains(&"changed".to_string()));
        assert!(entries.contains(&Mapping::new("3".to_string(), "3".to_string())));
    }
}
