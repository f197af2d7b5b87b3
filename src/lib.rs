//! # confstore
//!
//! Hierarchical configuration store with pluggable persistence backends and
//! path-level concurrency control.
//!
//! Data lives in a tree: scope → category → primary key → sub-keys. Any node
//! or subtree is addressed by a [`PathDescriptor`]. Storage engines implement
//! the [`Driver`] contract; a [`LockManager`] lets independent operations on
//! disjoint subtrees run freely while atomic read-modify-write sequences never
//! interleave with anything touching an overlapping subtree.
//!
//! ## Quick Start
//!
//! ```ignore
//! use confstore::prelude::*;
//!
//! let store = Store::builder("my-cog")
//!     .custom_category("PLAYLIST", 2)
//!     .build(Arc::new(MemoryDriver::new()))?;
//!
//! let prefix = store.path(Category::Guild, ["111"]).with_sub_keys(["prefix"]);
//! store.set(&prefix, json!("?")).await?;
//! assert_eq!(store.get(&prefix).await?, json!("?"));
//!
//! // Move everything to disk
//! let disk = JsonDriver::open("./data").await?;
//! store.migrate_to(&disk).await?;
//! ```
//!
//! ## Layers
//!
//! - [`confstore_core`]: paths, categories, errors
//! - [`confstore_concurrency`]: shared and atomic guards
//! - [`confstore_storage`]: driver contract, bulk export/import, engines
//! - this crate: the [`Store`] facade tying them together

#![warn(missing_docs)]

mod options;
mod session;
mod store;

pub mod prelude;

// Re-export main entry points
pub use options::StoreOptions;
pub use session::AtomicSession;
pub use store::{Store, StoreBuilder};

// Re-export layers
pub use confstore_concurrency::{AtomicGuard, ConflictMode, LockManager, PathKey, SharedGuard};
pub use confstore_core::{Category, CategoryRegistry, Error, PathDescriptor, Result, Value};
pub use confstore_storage::{
    split_primary_key, CategoryExport, Driver, ImportReport, JsonDriver, MemoryDriver,
};
