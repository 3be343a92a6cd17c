//! chained-hashmap: a single-threaded hash table built by hand on separate
//! chaining, with detached snapshots of its keys, values and mappings.
//!
//! Internal Design:
//!
//! Summary
//! - A bucket array of optional chain heads over a `SlotMap` arena of chain
//!   nodes. Each node owns its key and value, caches its hash and its current
//!   bucket, and names its successor by arena key.
//! - `put` scans the target chain by cached hash then `Eq`, overwriting in
//!   place or appending at the tail. `remove` tracks the predecessor and
//!   relinks around the removed node.
//! - Growth doubles the bucket array once `len / capacity > 0.75`, up to
//!   `2^30` buckets, and relinks every node in traversal order.
//! - `Traversal` walks buckets then chains. It backs the borrowing iterator,
//!   the snapshot views and growth.
//!
//! Constraints
//! - Single-threaded and unsynchronized; mutation needs `&mut`.
//! - Capacity is always a power of two and never shrinks.
//! - Keys are unique per table; `K: Hash + Eq` supplies hashing and equality,
//!   `S: BuildHasher` selects the hash function.
//! - Absence is `Option`, never a sentinel value.
//!
//! Snapshot semantics
//! - `keys()`, `values()` and `entries()` copy the table's contents into
//!   owned collections. They are not live views: editing a snapshot never
//!   edits the table, and a snapshot never observes later table edits.
//!
//! Errors
//! - Absent keys are not errors. The only error kind is
//!   [`TraversalError::Exhausted`], returned by [`Traversal::try_next`] once
//!   every entry has been yielded.

mod entry;
pub mod hash_table;
mod hash_table_proptest;
pub mod traversal;
mod views;

// Public surface
pub use entry::Mapping;
pub use hash_table::{HashTable, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use traversal::{Traversal, TraversalError};
