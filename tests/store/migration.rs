//! Migration Tests
//!
//! - Export shape per category
//! - Export, clear, import reproduces every leaf
//! - Moving a scope between engines

use crate::*;
use serde_json::Map;
use tempfile::TempDir;

/// Every leaf of a store as (flattened path, value)
fn leaves(value: &Value, prefix: Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let mut next = prefix.clone();
                next.push(key.clone());
                leaves(child, next, out);
            }
        }
        leaf => out.push((prefix, leaf.clone())),
    }
}

fn sorted_leaves(exported: &[CategoryExport]) -> Vec<(Vec<String>, Value)> {
    let mut out = Vec::new();
    for (category, data) in exported {
        leaves(data, vec![category.to_string()], &mut out);
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

async fn populate(store: &Store) {
    let playlist = store.register_custom_category("PLAYLIST", 2).unwrap();

    let global = store.path(Category::Global, Vec::<String>::new());
    store.set(&global.with_sub_keys(["prefix"]), json!("!")).await.unwrap();
    store.set(&global.with_sub_keys(["owners"]), json!([1, 2])).await.unwrap();
    store
        .set(&guild(store, "111").with_sub_keys(["prefix"]), json!("?"))
        .await
        .unwrap();
    store
        .set(&guild(store, "222"), json!({"prefix": ".", "locale": "en"}))
        .await
        .unwrap();
    store
        .set(&store.path(Category::Channel, ["c1"]).with_sub_keys(["muted"]), json!(true))
        .await
        .unwrap();
    store
        .set(&member(store, "111", "u1").with_sub_keys(["xp"]), json!(10))
        .await
        .unwrap();
    store
        .set(&member(store, "111", "u2"), json!({"xp": 20, "level": 2}))
        .await
        .unwrap();
    store
        .set(&member(store, "222", "u1").with_sub_keys(["xp"]), json!(30))
        .await
        .unwrap();
    store
        .set(
            &store.path(playlist, ["111", "chill"]).with_sub_keys(["tracks"]),
            json!(["a", "b"]),
        )
        .await
        .unwrap();
}

async fn clear_all(store: &Store) {
    for category in Category::BUILTIN.into_iter().chain(store.registry().custom_categories()) {
        store
            .clear(&PathDescriptor::root(store.scope_id(), category))
            .await
            .unwrap();
    }
}

/// Global and guild documents export and re-import in their documented shape
#[tokio::test]
async fn test_global_and_guild_export_shape() {
    let store = memory_store();
    store
        .set(&store.path(Category::Global, Vec::<String>::new()), json!({"prefix": "!"}))
        .await
        .unwrap();
    store
        .set(&guild(&store, "111"), json!({"prefix": "?"}))
        .await
        .unwrap();

    let exported = store.export().await.unwrap();
    assert_eq!(
        exported,
        vec![
            (Category::Global, json!({"prefix": "!"})),
            (Category::Guild, json!({"111": {"prefix": "?"}})),
        ]
    );
}

/// Exporting, clearing and importing restores every leaf at its path
#[tokio::test]
async fn test_export_clear_import_roundtrip() {
    let store = memory_store();
    populate(&store).await;

    let before = store.export().await.unwrap();
    let expected = sorted_leaves(&before);
    assert!(!expected.is_empty());

    clear_all(&store).await;
    assert!(store.export().await.unwrap().is_empty());

    let report = store.import(before).await.unwrap();
    assert!(report.is_complete());
    // global, 2 guilds, 1 channel, 3 members, 1 playlist
    assert_eq!(report.records_written, 8);

    let after = store.export().await.unwrap();
    assert_eq!(sorted_leaves(&after), expected);
}

/// Import keeps going past a category it cannot place
#[tokio::test]
async fn test_import_skips_unregistered_category() {
    let store = memory_store();
    let mut unknown = Map::new();
    unknown.insert("k".into(), json!({"v": 1}));

    let report = store
        .import(vec![
            (Category::Custom("UNREGISTERED".into()), Value::Object(unknown)),
            (Category::Role, json!({"r1": {"color": "red"}})),
        ])
        .await
        .unwrap();

    assert_eq!(report.imported, vec![Category::Role]);
    assert!(matches!(report.skipped[0].1, Error::UnknownCategory(_)));
    assert_eq!(
        store
            .get(&store.path(Category::Role, ["r1"]).with_sub_keys(["color"]))
            .await
            .unwrap(),
        json!("red")
    );
}

/// A scope moves from memory to disk and reads back identically
#[tokio::test]
async fn test_migrate_memory_to_json() {
    let store = memory_store();
    populate(&store).await;
    let expected = sorted_leaves(&store.export().await.unwrap());

    let dir = TempDir::new().unwrap();
    let disk = JsonDriver::open(dir.path()).await.unwrap();
    let report = store.migrate_to(&disk).await.unwrap();
    assert!(report.is_complete());

    let on_disk = Store::builder("cog")
        .custom_category("PLAYLIST", 2)
        .build(Arc::new(JsonDriver::open(dir.path()).await.unwrap()))
        .unwrap();
    assert_eq!(sorted_leaves(&on_disk.export().await.unwrap()), expected);
    assert_eq!(
        on_disk
            .get(&member(&on_disk, "111", "u2").with_sub_keys(["level"]))
            .await
            .unwrap(),
        json!(2)
    );
}

/// Migration refuses a target that cannot be reached
#[tokio::test]
async fn test_migrate_to_unreachable_target_fails() {
    let store = memory_store();
    populate(&store).await;

    let dir = TempDir::new().unwrap();
    let base = dir.path().join("gone");
    let disk = JsonDriver::open(&base).await.unwrap();
    std::fs::remove_dir_all(&base).unwrap();

    let err = store.migrate_to(&disk).await.unwrap_err();
    assert!(err.is_backend());
}
