//! avl-tables: two interchangeable hash table engines over caller-ordered
//! elements, plus the AVL tree one of them is built on.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a key/value index whose collision handling and growth can be
//!   reasoned about layer by layer.
//! - Layers:
//!   - AvlTree<T>: height-balanced BST in a slotmap arena. Duplicate
//!     inserts are no-ops; `replace` swaps an equal element in place.
//!   - ChainedTable<T, S>: `capacity` buckets, each an AvlTree. Collisions
//!     go into the bucket's tree.
//!   - ProbingTable<T, S>: one flat slot array with linear probing and
//!     tombstoned deletion.
//!   - Both tables implement `HashIndex<T>` and share nothing else.
//!
//! Element contract
//! - Ordering and equality come from `T: Ord`; bucket placement from the
//!   table's `S: BuildHasher`. `Hash` must agree with `Ord`'s equality or
//!   lookups miss. Nothing checks this at runtime.
//! - Elements are moved in and out, never cloned by the engines. `remove`
//!   returns the element; dropping it is the caller's business.
//! - `KeyValue<K, V>` compares and hashes by key, turning either table
//!   into a map queried with `&K`.
//!
//! Growth
//! - The chained table doubles before an insert when `len / capacity`
//!   reaches 0.7, the probing table when it exceeds 0.7. Only live
//!   elements count; tombstones do not.
//! - Resizes move every element into a fresh array, re-deriving its
//!   position from the hash. Probing-table tombstones are dropped.
//! - Allocation failure and capacity overflow abort the operation the way
//!   std collections do; there is no partial-table state.
//!
//! Reentrancy
//! - Single-threaded and synchronous. Every public table method enters a
//!   debug-only guard while user `Ord`/`Hash` code may run; calling back
//!   into the same table from those impls panics in debug builds. Release
//!   builds compile the guard away.
//!
//! Logging
//! - With the `tracing` feature, resizes are logged at debug level and
//!   rotations / tombstone reuse at trace level. Without it the logging
//!   macros expand to nothing.

#[macro_use]
mod trace;

pub mod avl;
mod avl_proptest;
pub mod chained;
pub mod entry;
pub mod hash;
pub mod probing;
mod reentrancy;
pub mod table;

// Public surface
pub use avl::{AvlTree, Order};
pub use chained::ChainedTable;
pub use entry::KeyValue;
pub use hash::IdentityState;
pub use probing::{ProbingTable, SlotState};
pub use table::{HashIndex, TableError, DEFAULT_CAPACITY, LOAD_FACTOR_LIMIT};
