//! Store integration tests
//!
//! Exercises the facade end to end over the reference engines:
//! - concurrency: shared/atomic interaction across overlapping paths
//! - migration: export/import round trips and engine-to-engine moves
//! - updates: read-modify-write under contention

mod concurrency;
mod migration;
mod updates;

pub use confstore::prelude::*;
pub use std::time::Duration;

/// Long enough for an unblocked acquire to finish, short enough to keep tests quick
pub const SHORT: Duration = Duration::from_millis(50);

/// Generous bound for work that must eventually complete
pub const LONG: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn memory_store() -> Arc<Store> {
    init_tracing();
    Arc::new(Store::new("cog", Arc::new(MemoryDriver::new())))
}

pub fn guild(store: &Store, id: &str) -> PathDescriptor {
    store.path(Category::Guild, [id])
}

pub fn member(store: &Store, guild: &str, user: &str) -> PathDescriptor {
    store.path(Category::Member, [guild, user])
}
