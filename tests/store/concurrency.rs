//! Concurrency Tests
//!
//! - Disjoint paths never wait on each other
//! - Atomic holds block every overlapping shared and atomic caller
//! - Shared counters return to zero

use crate::*;
use tokio::sync::Barrier;
use tokio::time::timeout;

/// Shared access on disjoint, non-prefix paths completes without waiting
#[tokio::test]
async fn test_disjoint_shared_access_never_waits() {
    let store = memory_store();
    let locks = store.lock_manager();

    let a = guild(&store, "1").with_sub_keys(["prefix"]);
    let b = member(&store, "2", "3").with_sub_keys(["xp"]);

    let _ga = locks.acquire_shared(&a).await;
    let gb = timeout(SHORT, locks.acquire_shared(&b)).await;
    assert!(gb.is_ok());
    assert_eq!(locks.waiter_count(), 0);
}

/// Many concurrent writers on different guilds all finish
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_different_entities() {
    const NUM_WRITERS: usize = 10;
    const WRITES_PER_TASK: u64 = 20;

    let store = memory_store();
    let barrier = Arc::new(Barrier::new(NUM_WRITERS));

    let handles: Vec<_> = (0..NUM_WRITERS)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                let path = guild(&store, &i.to_string()).with_sub_keys(["count"]);
                for j in 0..WRITES_PER_TASK {
                    store.set(&path, json!(j)).await.unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        timeout(LONG, h).await.unwrap().unwrap();
    }

    for i in 0..NUM_WRITERS {
        let path = guild(&store, &i.to_string()).with_sub_keys(["count"]);
        assert_eq!(store.get(&path).await.unwrap(), json!(WRITES_PER_TASK - 1));
    }
}

/// An atomic hold on P blocks shared and atomic callers on ancestors,
/// descendants and P itself until released
#[tokio::test]
async fn test_atomic_blocks_overlapping_paths() {
    let store = memory_store();
    let locks = store.lock_manager();
    let held = member(&store, "1", "2");

    let overlapping = [
        held.clone(),
        store.path(Category::Member, ["1"]),
        PathDescriptor::root("cog", Category::Member),
        held.with_sub_keys(["xp"]),
    ];

    let session = store.lock(&held).await.unwrap();
    for path in &overlapping {
        assert!(timeout(SHORT, locks.acquire_shared(path)).await.is_err(), "{path}");
        assert!(timeout(SHORT, locks.acquire_atomic(path)).await.is_err(), "{path}");
    }
    // Unrelated entity is unaffected
    assert!(timeout(SHORT, locks.acquire_shared(&member(&store, "1", "3")))
        .await
        .is_ok());
    assert_eq!(locks.waiter_count(), 0);

    session.release();
    for path in &overlapping {
        assert!(timeout(SHORT, locks.acquire_shared(path)).await.is_ok());
        assert!(timeout(SHORT, locks.acquire_atomic(path)).await.is_ok());
    }
}

/// A blocked operation resumes once the atomic holder releases
#[tokio::test]
async fn test_blocked_set_resumes_after_release() {
    let store = memory_store();
    let path = guild(&store, "1");
    let session = store.lock(&path).await.unwrap();

    let writer = {
        let store = Arc::clone(&store);
        let child = path.with_sub_keys(["prefix"]);
        tokio::spawn(async move { store.set(&child, json!("?")).await })
    };

    tokio::time::sleep(SHORT).await;
    assert!(!writer.is_finished());
    session.set(json!({"prefix": "!"})).await.unwrap();
    session.release();

    timeout(LONG, writer).await.unwrap().unwrap().unwrap();
    assert_eq!(store.get(&path).await.unwrap(), json!({"prefix": "?"}));
}

/// Shared counters drop by exactly one per release and vanish at zero
#[tokio::test]
async fn test_shared_release_accounting() {
    let store = memory_store();
    let locks = store.lock_manager();
    let path = guild(&store, "1");
    let child = path.with_sub_keys(["x"]);

    let guards = vec![
        locks.acquire_shared(&path).await,
        locks.acquire_shared(&path).await,
        locks.acquire_shared(&path).await,
    ];
    let child_guard = locks.acquire_shared(&child).await;
    assert_eq!(locks.access_count(&path), 3);
    assert_eq!(locks.access_count(&child), 1);

    let mut remaining = 3;
    for guard in guards {
        guard.release();
        remaining -= 1;
        assert_eq!(locks.access_count(&path), remaining);
    }
    assert!(locks.is_contended(&path));
    drop(child_guard);

    assert_eq!(locks.access_count(&child), 0);
    assert!(!locks.is_contended(&path));
    assert!(!locks.is_contended(&child));
}

/// Dropping a pending acquire leaves no waiter behind
#[tokio::test]
async fn test_cancelled_waiters_are_removed() {
    let store = memory_store();
    let locks = store.lock_manager();
    let path = guild(&store, "1");
    let _session = store.lock(&path).await.unwrap();

    for _ in 0..5 {
        let _ = timeout(Duration::from_millis(5), store.get(&path)).await;
    }
    assert_eq!(locks.waiter_count(), 0);
}
