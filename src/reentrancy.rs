//! Debug-only guard against reentrant table calls.
//!
//! The tables run user code (`Ord`, `Hash`) in the middle of a probe or a
//! rehash, while slots or buckets may be half moved. A key whose comparison
//! calls back into the same table would observe that state, so every public
//! table operation marks the table busy for its duration. A nested entry
//! panics in debug builds and naming both operations makes the culprit easy
//! to spot. Release builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Busy marker embedded in each table.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Same auto traits in every build profile: Send, never Sync.
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _unsync: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard drops.
    ///
    /// Panics in debug builds if another operation is already running.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> BusyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(running) = self.active.get() {
                panic!("reentrant call to `{op}` while `{running}` is in progress");
            }
            self.active.set(Some(op));
            BusyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            BusyGuard { _owner: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub(crate) struct BusyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}
