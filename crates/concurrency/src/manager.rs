//! Lock manager for path-level concurrency control
//!
//! Two access modes share one conflict relation (see [`ConflictMode`]):
//!
//! - **Shared**: countable, non-exclusive access used for single get/set/clear.
//!   Shared holders never block each other; they only wait for conflicting
//!   atomic holders to leave.
//! - **Atomic**: exclusive access used for read-modify-write sequences. While
//!   held, no shared or atomic operation on a conflicting path is in flight.
//!
//! ## Atomic acquisition sequence
//!
//! ```text
//! 1. Take the exact-key lock (tokio mutex, created lazily)
//! 2. Mark the key held with a fresh ticket. New shared access on any
//!    conflicting path now waits.
//! 3. Wait until no conflicting key is held under an earlier ticket
//! 4. Wait until every conflicting shared counter has drained to zero
//! ```
//!
//! ## Wake-up policy
//!
//! Every suspension registers a waiter (notification + predicate). Every
//! release walks the whole waiter list and notifies each waiter whose
//! predicate now holds. Woken callers re-check under the bookkeeping lock
//! before proceeding. There is no FIFO fairness across different keys.
//!
//! ## Cancellation
//!
//! Dropping a pending acquire future removes its waiter record and rolls back
//! whatever part of the acquisition already happened.

use crate::guard::{AtomicGuard, SharedGuard};
use crate::key::{ConflictMode, PathKey};
use confstore_core::PathDescriptor;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex as AsyncMutex, OwnedMutexGuard};

/// Tracks shared access counts and atomic holds per flattened path.
///
/// # Thread Safety
///
/// The bookkeeping tables sit behind a synchronous mutex that is only held for
/// short critical sections and never across an `.await`.
pub struct LockManager {
    mode: ConflictMode,
    state: Mutex<State>,
}

/// What a suspended caller is waiting for
#[derive(Debug, Clone)]
enum Condition {
    /// No conflicting key is held at all (shared entry)
    NoConflictingHold(PathKey),
    /// No conflicting key is held under a ticket older than ours
    NoEarlierConflictingHold(PathKey, u64),
    /// Every conflicting shared counter is zero
    NoConflictingAccess(PathKey),
}

struct Waiter {
    id: u64,
    condition: Condition,
    notify: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct Tables {
    /// In-flight shared operations per exact key; zero entries are removed
    access_counts: FxHashMap<PathKey, usize>,
    /// Exact-key locks, created on first atomic use
    exclusive_locks: FxHashMap<PathKey, Arc<AsyncMutex<()>>>,
    /// Keys whose atomic holder passed the exact-key lock, with their ticket
    held: FxHashMap<PathKey, u64>,
    next_ticket: u64,
}

#[derive(Default)]
struct State {
    tables: Tables,
    waiters: Vec<Waiter>,
    next_waiter_id: u64,
}

impl Tables {
    fn any_conflicting_hold(&self, key: &PathKey) -> bool {
        self.held.keys().any(|k| k.conflicts_with(key))
    }

    fn any_earlier_conflicting_hold(&self, key: &PathKey, ticket: u64) -> bool {
        self.held
            .iter()
            .any(|(k, t)| *t < ticket && k.conflicts_with(key))
    }

    fn any_conflicting_access(&self, key: &PathKey) -> bool {
        self.access_counts
            .iter()
            .any(|(k, count)| *count > 0 && k.conflicts_with(key))
    }

    fn satisfies(&self, condition: &Condition) -> bool {
        match condition {
            Condition::NoConflictingHold(key) => !self.any_conflicting_hold(key),
            Condition::NoEarlierConflictingHold(key, ticket) => {
                !self.any_earlier_conflicting_hold(key, *ticket)
            }
            Condition::NoConflictingAccess(key) => !self.any_conflicting_access(key),
        }
    }
}

impl State {
    fn register(&mut self, condition: Condition) -> (u64, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.waiters.push(Waiter {
            id,
            condition,
            notify: Some(tx),
        });
        (id, rx)
    }

    fn notify_waiters(&mut self) {
        let tables = &self.tables;
        for waiter in self.waiters.iter_mut() {
            if waiter.notify.is_some() && tables.satisfies(&waiter.condition) {
                if let Some(tx) = waiter.notify.take() {
                    let _ = tx.send(());
                }
            }
        }
    }
}

/// Removes a waiter record when the waiting future finishes or is dropped.
struct WaiterRegistration<'a> {
    manager: &'a LockManager,
    id: u64,
}

impl Drop for WaiterRegistration<'_> {
    fn drop(&mut self) {
        let id = self.id;
        self.manager.state.lock().waiters.retain(|w| w.id != id);
    }
}

impl LockManager {
    /// Create a manager using the default [`ConflictMode`]
    pub fn new() -> Self {
        Self::with_mode(ConflictMode::default())
    }

    /// Create a manager with an explicit conflict mode
    pub fn with_mode(mode: ConflictMode) -> Self {
        Self {
            mode,
            state: Mutex::new(State::default()),
        }
    }

    /// Conflict mode in use
    pub fn mode(&self) -> ConflictMode {
        self.mode
    }

    /// Key for `path` under this manager's conflict mode
    pub fn key_for(&self, path: &PathDescriptor) -> PathKey {
        PathKey::new(path, self.mode)
    }

    /// Acquire shared access to `path`.
    ///
    /// Returns immediately unless a conflicting path is atomically held, in
    /// which case the caller suspends until no such hold remains. Access is
    /// released when the returned guard is dropped.
    pub async fn acquire_shared(&self, path: &PathDescriptor) -> SharedGuard<'_> {
        let key = self.key_for(path);
        loop {
            let (id, rx) = {
                let mut state = self.state.lock();
                if !state.tables.any_conflicting_hold(&key) {
                    *state.tables.access_counts.entry(key.clone()).or_insert(0) += 1;
                    tracing::trace!(path = %path, "shared access acquired");
                    return SharedGuard::new(self, key);
                }
                state.register(Condition::NoConflictingHold(key.clone()))
            };
            tracing::debug!(path = %path, "shared access waiting on atomic hold");
            self.wait(id, rx).await;
        }
    }

    /// Acquire atomic (exclusive) access to `path`.
    ///
    /// See the module docs for the acquisition sequence. Released when the
    /// returned guard is dropped.
    pub async fn acquire_atomic(&self, path: &PathDescriptor) -> AtomicGuard<'_> {
        let key = self.key_for(path);

        let lock = {
            let mut state = self.state.lock();
            state
                .tables
                .exclusive_locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let exclusive = lock.lock_owned().await;
        let guard = self.mark_held(key.clone(), exclusive);
        let ticket = guard.ticket();

        self.wait_until(Condition::NoEarlierConflictingHold(key.clone(), ticket), path)
            .await;
        self.wait_until(Condition::NoConflictingAccess(key), path).await;

        tracing::trace!(path = %path, ticket, "atomic access acquired");
        guard
    }

    fn mark_held(&self, key: PathKey, exclusive: OwnedMutexGuard<()>) -> AtomicGuard<'_> {
        let mut state = self.state.lock();
        let ticket = state.tables.next_ticket;
        state.tables.next_ticket += 1;
        state.tables.held.insert(key.clone(), ticket);
        AtomicGuard::new(self, key, ticket, exclusive)
    }

    async fn wait_until(&self, condition: Condition, path: &PathDescriptor) {
        loop {
            let (id, rx) = {
                let mut state = self.state.lock();
                if state.tables.satisfies(&condition) {
                    return;
                }
                state.register(condition.clone())
            };
            tracing::debug!(path = %path, "atomic access waiting on conflicting operations");
            self.wait(id, rx).await;
        }
    }

    async fn wait(&self, id: u64, rx: oneshot::Receiver<()>) {
        let _registration = WaiterRegistration { manager: self, id };
        // A closed channel only means the record was dropped; callers re-check.
        let _ = rx.await;
    }

    pub(crate) fn release_shared(&self, key: &PathKey) {
        let mut state = self.state.lock();
        match state.tables.access_counts.get_mut(key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                state.tables.access_counts.remove(key);
            }
            None => {
                tracing::error!(?key, "shared release without matching acquire");
            }
        }
        state.notify_waiters();
    }

    pub(crate) fn release_atomic(
        &self,
        key: &PathKey,
        ticket: u64,
        exclusive: OwnedMutexGuard<()>,
    ) {
        let mut state = self.state.lock();
        if state.tables.held.get(key) == Some(&ticket) {
            state.tables.held.remove(key);
        }
        drop(exclusive);
        // Entries referenced only by the table have no holder and no one queued.
        state
            .tables
            .exclusive_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        state.notify_waiters();
    }

    /// In-flight shared operations on exactly `path`
    pub fn access_count(&self, path: &PathDescriptor) -> usize {
        let key = self.key_for(path);
        self.state
            .lock()
            .tables
            .access_counts
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Whether an atomic hold exists on `path` or a conflicting path
    pub fn is_locked(&self, path: &PathDescriptor) -> bool {
        let key = self.key_for(path);
        self.state.lock().tables.any_conflicting_hold(&key)
    }

    /// Whether any operation, shared or atomic, is in flight on a conflicting path
    pub fn is_contended(&self, path: &PathDescriptor) -> bool {
        let key = self.key_for(path);
        let state = self.state.lock();
        state.tables.any_conflicting_hold(&key) || state.tables.any_conflicting_access(&key)
    }

    /// Number of suspended acquisitions
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Number of exact-key locks currently allocated
    pub fn exclusive_lock_count(&self) -> usize {
        self.state.lock().tables.exclusive_locks.len()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LockManager")
            .field("mode", &self.mode)
            .field("access_counts", &state.tables.access_counts.len())
            .field("held", &state.tables.held.len())
            .field("waiters", &state.waiters.len())
            .finish()
    }
}
