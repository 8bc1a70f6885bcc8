//! ChainedTable: separate chaining with an AVL tree per bucket.
//!
//! A bucket is always an [`AvlTree`], possibly empty, so a bucket that
//! attracts many collisions still answers in `O(log n)`. The table doubles
//! before an insert once `len / capacity` reaches the load factor limit, and
//! the rehash moves elements between trees without cloning them.
//!
//! The bucket array and its count live in [`Buckets`], next to the hasher and
//! the reentrancy guard, so a guarded entry point can mutate the buckets while
//! the guard still borrows its own field.

use crate::avl::{AvlTree, Order};
use crate::reentrancy::DebugReentrancy;
use crate::table::{self, HashIndex, TableError, DEFAULT_CAPACITY};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

pub struct ChainedTable<T, S = RandomState> {
    buckets: Buckets<T>,
    hasher: S,
    reentrancy: DebugReentrancy,
}

struct Buckets<T> {
    trees: Vec<AvlTree<T>>,
    len: usize,
}

impl<T: Ord + Hash> Buckets<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            trees: empty_buckets(capacity),
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.trees.len()
    }

    fn insert<S: BuildHasher>(&mut self, hasher: &S, value: T) -> Option<T> {
        if table::at_load_limit(self.len, self.capacity()) {
            self.grow(hasher);
        }
        let idx = table::home_slot(hasher, &value, self.capacity());
        let replaced = self.trees[idx].replace(value);
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    fn grow<S: BuildHasher>(&mut self, hasher: &S) {
        let capacity = table::doubled(self.capacity());
        debug_log!(
            from = self.capacity(),
            to = capacity,
            len = self.len,
            "chained table resize"
        );
        let old = mem::replace(&mut self.trees, empty_buckets(capacity));
        for mut bucket in old {
            for value in bucket.drain() {
                let idx = table::home_slot(hasher, &value, capacity);
                let inserted = self.trees[idx].insert(value);
                debug_assert!(inserted, "rehash met a duplicate element");
            }
        }
    }
}

impl<T> ChainedTable<T>
where
    T: Ord + Hash,
{
    pub fn new() -> Self {
        Self::from_parts(DEFAULT_CAPACITY, RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<T> Default for ChainedTable<T>
where
    T: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> ChainedTable<T, S>
where
    T: Ord + Hash,
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self, TableError> {
        if capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        Ok(Self::from_parts(capacity, hasher))
    }

    fn from_parts(capacity: usize, hasher: S) -> Self {
        Self {
            buckets: Buckets::with_capacity(capacity),
            hasher,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn bucket_of<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        table::home_slot(&self.hasher, q, self.buckets.capacity())
    }

    /// Inserts `value`, replacing and returning an equal element if the table
    /// already holds one. Doubles the bucket array first when the table is at
    /// the load factor limit.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let _g = self.reentrancy.enter("ChainedTable::insert");
        self.buckets.insert(&self.hasher, value)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("ChainedTable::get");
        self.buckets.trees[self.bucket_of(q)].get(q)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.get(q).is_some()
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("ChainedTable::remove");
        let idx = self.bucket_of(q);
        let removed = self.buckets.trees[idx].remove(q)?;
        self.buckets.len -= 1;
        Some(removed)
    }

    /// Doubles the number of buckets and rehashes every element.
    pub fn resize(&mut self) {
        let _g = self.reentrancy.enter("ChainedTable::resize");
        self.buckets.grow(&self.hasher);
    }

    /// Self check: every bucket is a valid AVL tree, every element sits in
    /// the bucket its hash selects, and bucket sizes add up to `len`.
    pub fn validate(&self) -> bool {
        let _g = self.reentrancy.enter("ChainedTable::validate");
        let capacity = self.buckets.capacity();
        let mut total = 0;
        for (idx, bucket) in self.buckets.trees.iter().enumerate() {
            if !bucket.validate() {
                return false;
            }
            let mut misplaced = false;
            bucket.traverse(Order::In, |v| {
                misplaced |= table::home_slot(&self.hasher, v, capacity) != idx;
            });
            if misplaced {
                return false;
            }
            total += bucket.len();
        }
        total == self.buckets.len
    }

    /// Number of elements per bucket, in bucket order.
    pub fn bucket_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.trees.iter().map(AvlTree::len)
    }
}

fn empty_buckets<T>(capacity: usize) -> Vec<AvlTree<T>> {
    (0..capacity).map(|_| AvlTree::new()).collect()
}

impl<T, S> HashIndex<T> for ChainedTable<T, S>
where
    T: Ord + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, value: T) -> Option<T> {
        ChainedTable::insert(self, value)
    }

    fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        ChainedTable::get(self, q)
    }

    fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        ChainedTable::remove(self, q)
    }

    fn len(&self) -> usize {
        self.buckets.len
    }

    fn capacity(&self) -> usize {
        self.buckets.capacity()
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ChainedTable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedTable")
            .field("len", &self.buckets.len)
            .field("capacity", &self.buckets.trees.len())
            .field("buckets", &self.buckets.trees)
            .finish()
    }
}
