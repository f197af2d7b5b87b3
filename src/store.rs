//! Main entry point for confstore.
//!
//! A [`Store`] binds one scope id to a storage [`Driver`], a [`LockManager`]
//! and a [`CategoryRegistry`]. Every single operation runs under a shared
//! guard; [`Store::update`] and [`Store::lock`] run under an atomic guard.

use crate::options::StoreOptions;
use crate::session::AtomicSession;
use confstore_concurrency::{ConflictMode, LockManager};
use confstore_core::{Category, CategoryRegistry, Error, PathDescriptor, Result, Value};
use confstore_storage::{CategoryExport, Driver, ImportReport};
use parking_lot::RwLock;
use std::sync::Arc;

/// Hierarchical configuration store for one scope.
///
/// # Example
///
/// ```ignore
/// use confstore::prelude::*;
///
/// let store = Store::new("my-cog", Arc::new(MemoryDriver::new()));
///
/// let prefix = store.path(Category::Guild, ["111"]).with_sub_keys(["prefix"]);
/// store.set(&prefix, json!("?")).await?;
///
/// // Read-modify-write without interleaving
/// let counter = store.path(Category::Global, Vec::<String>::new()).with_sub_keys(["uses"]);
/// store.update(&counter, |old| Ok(json!(old.and_then(|v| v.as_u64()).unwrap_or(0) + 1))).await?;
/// ```
pub struct Store {
    scope_id: String,
    driver: Arc<dyn Driver>,
    locks: LockManager,
    registry: RwLock<CategoryRegistry>,
}

impl Store {
    /// Create a store with default options.
    pub fn new(scope_id: impl Into<String>, driver: Arc<dyn Driver>) -> Self {
        Self {
            scope_id: scope_id.into(),
            driver,
            locks: LockManager::new(),
            registry: RwLock::new(CategoryRegistry::new()),
        }
    }

    /// Create a builder for store configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::builder("my-cog")
    ///     .conflict_mode(ConflictMode::OrderedPrefix)
    ///     .custom_category("PLAYLIST", 2)
    ///     .build(Arc::new(MemoryDriver::new()))?;
    /// ```
    pub fn builder(scope_id: impl Into<String>) -> StoreBuilder {
        StoreBuilder::new(scope_id)
    }

    /// Scope id all paths built by this store belong to
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Underlying storage engine
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Lock manager guarding this store's paths
    pub fn lock_manager(&self) -> &LockManager {
        &self.locks
    }

    /// Copy of the current custom-category registry
    pub fn registry(&self) -> CategoryRegistry {
        self.registry.read().clone()
    }

    /// Register a custom category with its primary-key depth.
    pub fn register_custom_category(&self, name: impl Into<String>, depth: usize) -> Result<Category> {
        self.registry.write().register(name, depth)
    }

    /// Resolve a category tag, checking custom tags are registered.
    pub fn category(&self, tag: &str) -> Result<Category> {
        let category = Category::from_tag(tag);
        self.registry.read().depth_of(&category)?;
        Ok(category)
    }

    /// Path to an entity of this scope.
    pub fn path<I>(&self, category: Category, primary_key: I) -> PathDescriptor
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        PathDescriptor::new(
            self.scope_id.as_str(),
            category,
            primary_key,
            Vec::<String>::new(),
        )
    }

    /// Whether the storage engine is reachable
    pub async fn has_valid_connection(&self) -> bool {
        self.driver.has_valid_connection().await
    }

    /// Value at `path`. Fails with [`Error::NotFound`] if nothing is stored.
    pub async fn get(&self, path: &PathDescriptor) -> Result<Value> {
        check_category(path)?;
        let _guard = self.locks.acquire_shared(path).await;
        self.driver.get(path).await
    }

    /// Value at `path`, or `default` if nothing is stored.
    pub async fn get_or(&self, path: &PathDescriptor, default: Value) -> Result<Value> {
        match self.get(path).await {
            Err(e) if e.is_not_found() => Ok(default),
            other => other,
        }
    }

    /// Overwrite the value at `path`.
    pub async fn set(&self, path: &PathDescriptor, value: Value) -> Result<()> {
        check_category(path)?;
        let _guard = self.locks.acquire_shared(path).await;
        tracing::trace!(path = %path, "set");
        self.driver.set(path, value).await
    }

    /// Remove the subtree at `path`. Not an error if nothing is stored.
    pub async fn clear(&self, path: &PathDescriptor) -> Result<()> {
        check_category(path)?;
        let _guard = self.locks.acquire_shared(path).await;
        tracing::trace!(path = %path, "clear");
        self.driver.clear(path).await
    }

    /// Atomically read, transform and write back the value at `path`.
    ///
    /// `apply` receives the current value (`None` if nothing is stored) and
    /// returns the value to store. No other operation on an overlapping path
    /// runs in between. If `apply` fails nothing is written.
    pub async fn update<F>(&self, path: &PathDescriptor, apply: F) -> Result<Value>
    where
        F: FnOnce(Option<Value>) -> Result<Value> + Send,
    {
        let session = self.lock(path).await?;
        let current = match session.get().await {
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        let next = apply(current)?;
        session.set(next.clone()).await?;
        Ok(next)
    }

    /// Hold atomic access to `path` for a multi-step sequence.
    ///
    /// Fails with [`Error::InvalidCategory`] for an empty category tag.
    /// Access is released when the session is dropped.
    pub async fn lock(&self, path: &PathDescriptor) -> Result<AtomicSession<'_>> {
        check_category(path)?;
        let guard = self.locks.acquire_atomic(path).await;
        Ok(AtomicSession::new(self, path.clone(), guard))
    }

    /// Export every category of this scope.
    ///
    /// Takes no guards; stop other traffic before exporting.
    pub async fn export(&self) -> Result<Vec<CategoryExport>> {
        let registry = self.registry();
        self.driver.export_all(&self.scope_id, &registry).await
    }

    /// Import exported categories into this scope.
    ///
    /// Takes no guards; stop other traffic before importing.
    pub async fn import(&self, records: Vec<CategoryExport>) -> Result<ImportReport> {
        let registry = self.registry();
        self.driver
            .import_all(&self.scope_id, records, &registry)
            .await
    }

    /// Copy this scope's data into another engine.
    pub async fn migrate_to(&self, target: &dyn Driver) -> Result<ImportReport> {
        if !target.has_valid_connection().await {
            return Err(Error::Backend(format!(
                "migration target {} has no valid connection",
                target.name()
            )));
        }
        let registry = self.registry();
        let records = self.driver.export_all(&self.scope_id, &registry).await?;
        let report = target
            .import_all(&self.scope_id, records, &registry)
            .await?;
        tracing::info!(
            scope = %self.scope_id,
            from = self.driver.name(),
            to = target.name(),
            categories = report.imported.len(),
            records = report.records_written,
            skipped = report.skipped.len(),
            "migration finished"
        );
        Ok(report)
    }
}

/// An empty category tag drops out of the flattened path, which would then
/// address the whole scope.
fn check_category(path: &PathDescriptor) -> Result<()> {
    if path.category().as_str().is_empty() {
        return Err(Error::InvalidCategory(String::new()));
    }
    Ok(())
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("scope_id", &self.scope_id)
            .field("driver", &self.driver.name())
            .field("locks", &self.locks)
            .finish()
    }
}

/// Builder for store configuration.
pub struct StoreBuilder {
    scope_id: String,
    options: StoreOptions,
}

impl StoreBuilder {
    /// Create a new builder with default options.
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            options: StoreOptions::default(),
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Set how overlapping paths are detected.
    pub fn conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.options = self.options.conflict_mode(mode);
        self
    }

    /// Register a custom category when the store is built.
    pub fn custom_category(mut self, name: impl Into<String>, depth: usize) -> Self {
        self.options = self.options.custom_category(name, depth);
        self
    }

    /// Build the store on top of `driver`.
    ///
    /// Fails if a configured custom category uses a built-in name.
    pub fn build(self, driver: Arc<dyn Driver>) -> Result<Store> {
        let mut registry = CategoryRegistry::new();
        for (name, depth) in self.options.custom_categories {
            registry.register(name, depth)?;
        }
        Ok(Store {
            scope_id: self.scope_id,
            driver,
            locks: LockManager::with_mode(self.options.conflict_mode),
            registry: RwLock::new(registry),
        })
    }
}
