//! In-process engine
//!
//! Keeps one nested document per scope. Useful for tests, caching and as the
//! source or target of a migration.

use crate::driver::Driver;
use crate::tree;
use async_trait::async_trait;
use confstore_core::{Error, PathDescriptor, Result, Value};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Engine backed by in-memory JSON documents, one per scope.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    scopes: RwLock<HashMap<String, Value>>,
}

impl MemoryDriver {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    async fn has_valid_connection(&self) -> bool {
        true
    }

    async fn get(&self, path: &PathDescriptor) -> Result<Value> {
        let scopes = self.scopes.read();
        scopes
            .get(path.scope_id())
            .and_then(|doc| tree::lookup(doc, &path.scoped_segments()))
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    async fn set(&self, path: &PathDescriptor, value: Value) -> Result<()> {
        let mut scopes = self.scopes.write();
        let doc = scopes
            .entry(path.scope_id().to_string())
            .or_insert_with(tree::empty);
        tree::insert(doc, &path.scoped_segments(), value)
            .map_err(|e| e.into_error(path))
    }

    async fn clear(&self, path: &PathDescriptor) -> Result<()> {
        let mut scopes = self.scopes.write();
        if let Some(doc) = scopes.get_mut(path.scope_id()) {
            tree::remove(doc, &path.scoped_segments());
        }
        Ok(())
    }
}
