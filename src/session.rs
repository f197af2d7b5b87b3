//! Atomic sessions for multi-step sequences.

use crate::store::Store;
use confstore_concurrency::AtomicGuard;
use confstore_core::{PathDescriptor, Result, Value};

/// Atomic access to one subtree of a [`Store`].
///
/// While the session lives, no other operation on an overlapping path is in
/// flight. Operations go straight to the driver without taking further guards,
/// so only the locked path and its descendants may be touched.
#[must_use = "atomic access is released as soon as the session is dropped"]
pub struct AtomicSession<'a> {
    store: &'a Store,
    path: PathDescriptor,
    guard: AtomicGuard<'a>,
}

impl<'a> AtomicSession<'a> {
    pub(crate) fn new(store: &'a Store, path: PathDescriptor, guard: AtomicGuard<'a>) -> Self {
        Self { store, path, guard }
    }

    /// Locked path
    pub fn path(&self) -> &PathDescriptor {
        &self.path
    }

    /// Value at the locked path
    pub async fn get(&self) -> Result<Value> {
        self.store.driver().get(&self.path).await
    }

    /// Overwrite the value at the locked path
    pub async fn set(&self, value: Value) -> Result<()> {
        self.store.driver().set(&self.path, value).await
    }

    /// Remove the subtree at the locked path
    pub async fn clear(&self) -> Result<()> {
        self.store.driver().clear(&self.path).await
    }

    /// Value at a descendant of the locked path
    pub async fn get_child(&self, sub_keys: &[&str]) -> Result<Value> {
        let child = self.path.with_sub_keys(sub_keys.iter().copied());
        self.store.driver().get(&child).await
    }

    /// Overwrite a descendant of the locked path
    pub async fn set_child(&self, sub_keys: &[&str], value: Value) -> Result<()> {
        let child = self.path.with_sub_keys(sub_keys.iter().copied());
        self.store.driver().set(&child, value).await
    }

    /// Release atomic access now instead of at end of scope
    pub fn release(self) {
        tracing::trace!(path = %self.path, ticket = self.guard.ticket(), "session released");
        self.guard.release();
    }
}

impl std::fmt::Debug for AtomicSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicSession")
            .field("path", &self.path)
            .field("guard", &self.guard)
            .finish()
    }
}
