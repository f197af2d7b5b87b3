//! Update Tests
//!
//! Read-modify-write sequences must not lose increments, whether they race
//! other updates on the same path or plain writes to overlapping paths.

use crate::*;
use tokio::time::timeout;

fn bump(old: Option<Value>) -> Result<Value> {
    Ok(json!(old.and_then(|v| v.as_u64()).unwrap_or(0) + 1))
}

/// Concurrent increments on one counter are never lost
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_same_path() {
    const NUM_TASKS: usize = 8;
    const UPDATES_PER_TASK: usize = 25;

    let store = memory_store();
    let counter = guild(&store, "1").with_sub_keys(["uses"]);

    let handles: Vec<_> = (0..NUM_TASKS)
        .map(|_| {
            let store = Arc::clone(&store);
            let counter = counter.clone();
            tokio::spawn(async move {
                for _ in 0..UPDATES_PER_TASK {
                    store.update(&counter, bump).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for h in handles {
        timeout(LONG, h).await.unwrap().unwrap();
    }
    assert_eq!(
        store.get(&counter).await.unwrap(),
        json!((NUM_TASKS * UPDATES_PER_TASK) as u64)
    );
}

/// Updates on a parent and on its children serialize against each other
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_updates_on_ancestor_and_descendant() {
    const ROUNDS: usize = 30;

    let store = memory_store();
    let parent = guild(&store, "1");
    let child = parent.with_sub_keys(["count"]);
    store.set(&child, json!(0)).await.unwrap();

    let via_child = {
        let store = Arc::clone(&store);
        let child = child.clone();
        tokio::spawn(async move {
            for _ in 0..ROUNDS {
                store.update(&child, bump).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    let via_parent = {
        let store = Arc::clone(&store);
        let parent = parent.clone();
        tokio::spawn(async move {
            for _ in 0..ROUNDS {
                store
                    .update(&parent, |old| {
                        let mut doc = old.unwrap_or_else(|| json!({}));
                        let count = doc["count"].as_u64().unwrap_or(0);
                        doc["count"] = json!(count + 1);
                        Ok(doc)
                    })
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    timeout(LONG, via_child).await.unwrap().unwrap();
    timeout(LONG, via_parent).await.unwrap().unwrap();
    assert_eq!(store.get(&child).await.unwrap(), json!((2 * ROUNDS) as u64));
}

/// Atomic sessions on sibling entities proceed side by side
#[tokio::test]
async fn test_sibling_sessions_are_independent() {
    let store = memory_store();
    let first = store.lock(&member(&store, "1", "a")).await.unwrap();
    let second = timeout(SHORT, store.lock(&member(&store, "1", "b"))).await;
    assert!(second.is_ok());
    drop(first);
}
