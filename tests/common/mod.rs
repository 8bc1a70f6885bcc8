//! Shared helpers for the integration tests.
//!
//! Engine events are only emitted with the `tracing` feature:
//!
//! ```bash
//! RUST_LOG=avl_tables=trace cargo test --features tracing -- --nocapture
//! ```

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-writer subscriber filtered by `RUST_LOG` (default
/// `avl_tables=debug`). Safe to call from every test; only the first call
/// takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("avl_tables=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Hasher that sends every key to the same bucket / home slot.
#[derive(Clone, Default)]
pub struct ConstBuildHasher;

pub struct ConstHasher;

impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}

impl std::hash::Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}
