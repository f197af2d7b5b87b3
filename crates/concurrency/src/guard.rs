//! Scoped access guards
//!
//! Guards release their access on drop, so every exit path of a caller
//! (including `?` and cancellation) gives the slot back.

use crate::key::PathKey;
use crate::manager::LockManager;
use tokio::sync::OwnedMutexGuard;

/// Shared access to one path. Released on drop.
#[must_use = "shared access is released as soon as the guard is dropped"]
pub struct SharedGuard<'a> {
    manager: &'a LockManager,
    key: Option<PathKey>,
}

impl<'a> SharedGuard<'a> {
    pub(crate) fn new(manager: &'a LockManager, key: PathKey) -> Self {
        Self {
            manager,
            key: Some(key),
        }
    }

    /// Lock key this guard holds
    pub fn key(&self) -> Option<&PathKey> {
        self.key.as_ref()
    }

    /// Release the access now instead of at end of scope
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(key) = self.key.take() {
            self.manager.release_shared(&key);
            tracing::trace!(?key, "shared access released");
        }
    }
}

impl Drop for SharedGuard<'_> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for SharedGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedGuard").field("key", &self.key).finish()
    }
}

/// Atomic (exclusive) access to one path. Released on drop.
#[must_use = "atomic access is released as soon as the guard is dropped"]
pub struct AtomicGuard<'a> {
    manager: &'a LockManager,
    key: PathKey,
    ticket: u64,
    exclusive: Option<OwnedMutexGuard<()>>,
}

impl<'a> AtomicGuard<'a> {
    pub(crate) fn new(
        manager: &'a LockManager,
        key: PathKey,
        ticket: u64,
        exclusive: OwnedMutexGuard<()>,
    ) -> Self {
        Self {
            manager,
            key,
            ticket,
            exclusive: Some(exclusive),
        }
    }

    /// Lock key this guard holds
    pub fn key(&self) -> &PathKey {
        &self.key
    }

    /// Order in which this hold was taken relative to other atomic holds
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Release the lock now instead of at end of scope
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(exclusive) = self.exclusive.take() {
            self.manager.release_atomic(&self.key, self.ticket, exclusive);
            tracing::trace!(key = ?self.key, ticket = self.ticket, "atomic access released");
        }
    }
}

impl Drop for AtomicGuard<'_> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for AtomicGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicGuard")
            .field("key", &self.key)
            .field("ticket", &self.ticket)
            .finish()
    }
}
