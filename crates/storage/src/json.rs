//! File-backed engine
//!
//! Stores one pretty-printed JSON document per scope:
//!
//! ```text
//! <base>/<scope_id>/settings.json
//! ```
//!
//! Documents are loaded on first use and cached. Every write rewrites the
//! scope's file through a temporary file that is synced before being renamed
//! over the old one; the directory is synced after the rename on unix. A
//! crash or power loss leaves either the old or the new document on disk.

use crate::driver::Driver;
use crate::tree;
use async_trait::async_trait;
use confstore_core::{Error, PathDescriptor, Result, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const DOCUMENT_NAME: &str = "settings.json";

/// Engine storing one JSON document per scope under a base directory.
#[derive(Debug)]
pub struct JsonDriver {
    base: PathBuf,
    /// Loaded documents. Also serializes writes so files are rewritten in order.
    cache: Mutex<HashMap<String, Value>>,
}

impl JsonDriver {
    /// Open (creating if needed) a store rooted at `base`.
    pub async fn open(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base).await?;
        tracing::debug!(base = %base.display(), "json driver opened");
        Ok(Self {
            base,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Base directory
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Location of the document for `scope_id`
    pub fn document_path(&self, scope_id: &str) -> Result<PathBuf> {
        if scope_id.is_empty()
            || scope_id == "."
            || scope_id == ".."
            || scope_id.contains(['/', '\\'])
        {
            return Err(Error::Backend(format!(
                "scope id {scope_id:?} cannot be used as a directory name"
            )));
        }
        Ok(self.base.join(scope_id).join(DOCUMENT_NAME))
    }

    async fn load(&self, scope_id: &str) -> Result<Value> {
        let file = self.document_path(scope_id)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(tree::empty()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, scope_id: &str, doc: &Value) -> Result<()> {
        let file = self.document_path(scope_id)?;
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = file.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(doc)?;

        let mut out = tokio::fs::File::create(&tmp).await?;
        out.write_all(&bytes).await?;
        out.sync_all().await?;
        drop(out);

        tokio::fs::rename(&tmp, &file).await?;
        #[cfg(unix)]
        {
            if let Some(dir) = file.parent() {
                tokio::fs::File::open(dir).await?.sync_all().await?;
            }
        }
        tracing::trace!(scope = scope_id, file = %file.display(), "document written");
        Ok(())
    }

    /// Run `apply` against the scope's document and persist it if it changed.
    async fn modify<F>(&self, scope_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<bool> + Send,
    {
        let mut cache = self.cache.lock().await;
        if !cache.contains_key(scope_id) {
            let doc = self.load(scope_id).await?;
            cache.insert(scope_id.to_string(), doc);
        }
        let Some(doc) = cache.get_mut(scope_id) else {
            return Err(Error::Backend(format!("document for {scope_id} missing from cache")));
        };

        let mut updated = doc.clone();
        if apply(&mut updated)? {
            self.persist(scope_id, &updated).await?;
            *doc = updated;
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for JsonDriver {
    fn name(&self) -> &str {
        "json"
    }

    async fn has_valid_connection(&self) -> bool {
        tokio::fs::metadata(&self.base)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn get(&self, path: &PathDescriptor) -> Result<Value> {
        let scope_id = path.scope_id();
        let mut cache = self.cache.lock().await;
        if !cache.contains_key(scope_id) {
            let doc = self.load(scope_id).await?;
            cache.insert(scope_id.to_string(), doc);
        }
        cache
            .get(scope_id)
            .and_then(|doc| tree::lookup(doc, &path.scoped_segments()))
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    async fn set(&self, path: &PathDescriptor, value: Value) -> Result<()> {
        let segments = path.scoped_segments();
        self.modify(path.scope_id(), move |doc| {
            tree::insert(doc, &segments, value)
                .map(|_| true)
                .map_err(|e| e.into_error(path))
        })
        .await
    }

    async fn clear(&self, path: &PathDescriptor) -> Result<()> {
        let segments = path.scoped_segments();
        self.modify(path.scope_id(), move |doc| Ok(tree::remove(doc, &segments)))
            .await
    }
}
