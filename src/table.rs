//! Contract shared by the two hash table backends.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

/// Capacity used by `new()` / `Default`.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor above which a table doubles before inserting.
pub const LOAD_FACTOR_LIMIT: f64 = 0.7;

// LOAD_FACTOR_LIMIT as an exact ratio, so the checks stay in integers.
const LIMIT_NUM: usize = 7;
const LIMIT_DEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table capacity must be greater than zero")]
    ZeroCapacity,
}

/// Key/value index over `T`, where equality and ordering come from `T: Ord`
/// and bucket placement from the table's `BuildHasher`.
///
/// Inserting an element equal to a stored one replaces it. Lookups accept
/// any borrowed form `Q` of `T` whose `Ord` and `Hash` agree with `T`'s.
pub trait HashIndex<T> {
    /// Inserts `value`, returning the equal element it replaced, if any.
    fn insert(&mut self, value: T) -> Option<T>;

    fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord;

    fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.get(q).is_some()
    }

    /// Removes and returns the element equal to `q`.
    fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets or slots.
    fn capacity(&self) -> usize;

    fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }
}

/// Bucket or home slot of `q` in a table of `capacity` entries.
#[inline]
pub(crate) fn home_slot<S, Q>(hasher: &S, q: &Q, capacity: usize) -> usize
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    (hasher.hash_one(q) % capacity as u64) as usize
}

/// `len / capacity >= LOAD_FACTOR_LIMIT`
#[inline]
pub(crate) fn at_load_limit(len: usize, capacity: usize) -> bool {
    len * LIMIT_DEN >= capacity * LIMIT_NUM
}

/// `len / capacity > LOAD_FACTOR_LIMIT`
#[inline]
pub(crate) fn over_load_limit(len: usize, capacity: usize) -> bool {
    len * LIMIT_DEN > capacity * LIMIT_NUM
}

/// Capacity after one doubling. Overflow is as fatal as a failed allocation.
#[inline]
pub(crate) fn doubled(capacity: usize) -> usize {
    capacity
        .checked_mul(2)
        .expect("table capacity overflow")
}
