//! ProbingTable: open addressing with linear probing and tombstones.
//!
//! Removal leaves a `Tombstone` rather than an `Empty` slot so that probe
//! chains running through the removed slot stay intact; lookups skip
//! tombstones and only stop at `Empty`. Inserts reuse the first tombstone
//! on their probe path. Tombstones are only cleared by a resize, which
//! reinserts the live elements into a fresh all-`Empty` array.
//!
//! The slot array and its counters live in [`SlotArray`]; the table wraps it
//! with the hasher and the reentrancy guard.

use crate::reentrancy::DebugReentrancy;
use crate::table::{self, HashIndex, TableError, DEFAULT_CAPACITY};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

#[derive(Debug)]
enum Slot<T> {
    Empty,
    Occupied(T),
    Tombstone,
}

/// Observable state of a slot, see [`ProbingTable::slot_state`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SlotState {
    Empty,
    Occupied,
    Tombstone,
}

impl<T> Slot<T> {
    fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Occupied(_) => SlotState::Occupied,
            Slot::Tombstone => SlotState::Tombstone,
        }
    }

    fn into_value(self) -> Option<T> {
        match self {
            Slot::Occupied(v) => Some(v),
            Slot::Empty | Slot::Tombstone => None,
        }
    }
}

struct SlotArray<T> {
    slots: Vec<Slot<T>>,
    len: usize,
    tombstones: usize,
}

impl<T: Ord + Hash> SlotArray<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity),
            len: 0,
            tombstones: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Probes from the home slot of `q`. Tombstones never end the probe;
    /// an `Empty` slot or a full lap does.
    fn find<S, Q>(&self, hasher: &S, q: &Q) -> Option<(usize, &T)>
    where
        S: BuildHasher,
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let capacity = self.capacity();
        let start = table::home_slot(hasher, q, capacity);
        for step in 0..capacity {
            let idx = (start + step) % capacity;
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(v) if q.cmp(v.borrow()) == Ordering::Equal => {
                    return Some((idx, v));
                }
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }
        None
    }

    fn insert<S: BuildHasher>(&mut self, hasher: &S, value: T) -> Option<T> {
        if table::over_load_limit(self.len, self.capacity()) {
            self.grow(hasher);
        }
        self.place(hasher, value)
    }

    fn place<S: BuildHasher>(&mut self, hasher: &S, value: T) -> Option<T> {
        let capacity = self.capacity();
        let start = table::home_slot(hasher, &value, capacity);
        let mut first_tomb = None;
        let mut free = None;
        for step in 0..capacity {
            let idx = (start + step) % capacity;
            match &mut self.slots[idx] {
                Slot::Empty => {
                    free = Some(first_tomb.unwrap_or(idx));
                    break;
                }
                Slot::Occupied(v) => {
                    if value.cmp(v) == Ordering::Equal {
                        return Some(mem::replace(v, value));
                    }
                }
                Slot::Tombstone => {
                    first_tomb.get_or_insert(idx);
                }
            }
        }

        // A full lap without an Empty slot: every slot is live or a tombstone.
        let Some(idx) = free.or(first_tomb) else {
            self.grow(hasher);
            return self.place(hasher, value);
        };
        if matches!(self.slots[idx], Slot::Tombstone) {
            trace_log!(slot = idx, "probing table reuses tombstone");
            self.tombstones -= 1;
        }
        self.slots[idx] = Slot::Occupied(value);
        self.len += 1;
        None
    }

    fn remove<S, Q>(&mut self, hasher: &S, q: &Q) -> Option<T>
    where
        S: BuildHasher,
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let (idx, _) = self.find(hasher, q)?;
        let removed = mem::replace(&mut self.slots[idx], Slot::Tombstone).into_value()?;
        self.len -= 1;
        self.tombstones += 1;
        Some(removed)
    }

    /// Moves every live element into a fresh array twice the size. The source
    /// holds no duplicates, so each element goes to the first non-occupied
    /// slot of its new probe path without comparisons.
    fn grow<S: BuildHasher>(&mut self, hasher: &S) {
        let capacity = table::doubled(self.capacity());
        debug_log!(
            from = self.capacity(),
            to = capacity,
            len = self.len,
            dropped_tombstones = self.tombstones,
            "probing table resize"
        );
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.tombstones = 0;
        for value in old.into_iter().filter_map(Slot::into_value) {
            let mut idx = table::home_slot(hasher, &value, capacity);
            while matches!(self.slots[idx], Slot::Occupied(_)) {
                idx = (idx + 1) % capacity;
            }
            self.slots[idx] = Slot::Occupied(value);
        }
    }
}

pub struct ProbingTable<T, S = RandomState> {
    array: SlotArray<T>,
    hasher: S,
    reentrancy: DebugReentrancy,
}

impl<T> ProbingTable<T>
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

impl<T> Default for ProbingTable<T>
where
    T: Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> ProbingTable<T, S>
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
            array: SlotArray::with_capacity(capacity),
            hasher,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.array.len
    }

    pub fn is_empty(&self) -> bool {
        self.array.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.array.capacity()
    }

    /// Slots holding a removed marker. Always 0 right after a resize.
    pub fn tombstones(&self) -> usize {
        self.array.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// State of slot `idx`, or `None` past the end of the array.
    pub fn slot_state(&self, idx: usize) -> Option<SlotState> {
        self.array.slots.get(idx).map(Slot::state)
    }

    /// Index of the slot holding the element equal to `q`.
    pub fn slot_of<Q>(&self, q: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("ProbingTable::slot_of");
        self.array.find(&self.hasher, q).map(|(idx, _)| idx)
    }

    /// Inserts `value`, replacing and returning an equal element if the table
    /// already holds one. Doubles the slot array first when the table is over
    /// the load factor limit.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let _g = self.reentrancy.enter("ProbingTable::insert");
        self.array.insert(&self.hasher, value)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("ProbingTable::get");
        self.array.find(&self.hasher, q).map(|(_, v)| v)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        self.get(q).is_some()
    }

    /// Removes and returns the element equal to `q`, leaving a tombstone.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        let _g = self.reentrancy.enter("ProbingTable::remove");
        self.array.remove(&self.hasher, q)
    }

    /// Doubles the number of slots and rehashes every live element.
    pub fn resize(&mut self) {
        let _g = self.reentrancy.enter("ProbingTable::resize");
        self.array.grow(&self.hasher);
    }

    /// Self check: live and tombstone counts match the slots, and every live
    /// element is the first match on its own probe path (so it is reachable
    /// and has no duplicate).
    pub fn validate(&self) -> bool {
        let _g = self.reentrancy.enter("ProbingTable::validate");
        let mut live = 0;
        let mut tombs = 0;
        for (idx, slot) in self.array.slots.iter().enumerate() {
            match slot {
                Slot::Occupied(v) => {
                    live += 1;
                    if self.array.find::<S, T>(&self.hasher, v).map(|(i, _)| i) != Some(idx) {
                        return false;
                    }
                }
                Slot::Tombstone => tombs += 1,
                Slot::Empty => {}
            }
        }
        live == self.array.len && tombs == self.array.tombstones
    }
}

fn empty_slots<T>(capacity: usize) -> Vec<Slot<T>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

impl<T, S> HashIndex<T> for ProbingTable<T, S>
where
    T: Ord + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, value: T) -> Option<T> {
        ProbingTable::insert(self, value)
    }

    fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        ProbingTable::get(self, q)
    }

    fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Ord,
    {
        ProbingTable::remove(self, q)
    }

    fn len(&self) -> usize {
        self.array.len
    }

    fn capacity(&self) -> usize {
        self.array.capacity()
    }
}

impl<T: fmt::Debug, S> fmt::Debug for ProbingTable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbingTable")
            .field("len", &self.array.len)
            .field("capacity", &self.array.slots.len())
            .field("tombstones", &self.array.tombstones)
            .field("slots", &self.array.slots)
            .finish()
    }
}
