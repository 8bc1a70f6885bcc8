//! Identity hashing for integer keys.
//!
//! With [`IdentityState`] an integer hashes to itself, so a key's home
//! bucket is `key mod capacity`. Useful when keys are already well spread
//! (pre-hashed ids) and for pinning placement in tests.

use core::hash::{BuildHasher, Hasher};

#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher(0)
    }
}

/// Hashes the first integer written to itself. Further writes (composite
/// keys, strings, slices) are folded in, so such keys still hash, with no
/// quality guarantees.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityHasher(u64);

impl IdentityHasher {
    #[inline]
    fn fold(&mut self, v: u64) {
        self.0 = self.0.rotate_left(8) ^ v;
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.fold(u64::from(b));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.fold(u64::from(i));
    }

    fn write_u16(&mut self, i: u16) {
        self.fold(u64::from(i));
    }

    fn write_u32(&mut self, i: u32) {
        self.fold(u64::from(i));
    }

    fn write_u64(&mut self, i: u64) {
        self.fold(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.fold(i as u64);
    }

    fn write_i16(&mut self, i: i16) {
        self.fold(i as u64);
    }

    fn write_i32(&mut self, i: i32) {
        self.fold(i as u64);
    }

    fn write_i64(&mut self, i: i64) {
        self.fold(i as u64);
    }

    fn write_isize(&mut self, i: isize) {
        self.fold(i as u64);
    }
}
