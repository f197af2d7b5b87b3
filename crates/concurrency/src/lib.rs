//! Concurrency layer for confstore
//!
//! This crate implements path-level access control with:
//! - Shared access: counted, non-exclusive, blocked only by atomic holds
//! - Atomic access: exclusive read-modify-write over a subtree
//! - Ancestor/descendant conflict detection ([`ConflictMode`])
//! - Predicate-based waiter wake-up with cancellation cleanup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod guard;
pub mod key;
pub mod manager;

pub use guard::{AtomicGuard, SharedGuard};
pub use key::{ConflictMode, PathKey};
pub use manager::LockManager;
