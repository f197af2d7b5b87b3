//! Backend driver contract
//!
//! A storage engine implements [`Driver::get`], [`Driver::set`],
//! [`Driver::clear`] and [`Driver::has_valid_connection`]. Bulk
//! [`Driver::export_all`] / [`Driver::import_all`] are provided on top of
//! those and only need overriding when an engine has a faster native path.
//!
//! Bulk operations take no concurrency guards. Callers migrating data are
//! expected to stop normal traffic first.

use crate::split::split_primary_key;
use async_trait::async_trait;
use confstore_core::{Category, CategoryRegistry, Error, PathDescriptor, Result, Value};

/// One exported category: its tag and the whole nested document under it
pub type CategoryExport = (Category, Value);

/// Outcome of [`Driver::import_all`]
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Categories fully imported, in input order
    pub imported: Vec<Category>,
    /// Categories skipped, with the reason
    pub skipped: Vec<(Category, Error)>,
    /// Number of `set` calls issued
    pub records_written: usize,
}

impl ImportReport {
    /// Whether every category was imported
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Storage engine contract, keyed by [`PathDescriptor`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Short engine name for logs
    fn name(&self) -> &str;

    /// Backend-specific liveness check. Does not mutate state.
    async fn has_valid_connection(&self) -> bool;

    /// Value stored at exactly `path`.
    ///
    /// Fails with [`Error::NotFound`] if nothing is stored there.
    async fn get(&self, path: &PathDescriptor) -> Result<Value>;

    /// Overwrite the value at `path`, creating intermediate nodes as needed.
    async fn set(&self, path: &PathDescriptor, value: Value) -> Result<()>;

    /// Remove the subtree rooted at `path`. Not an error if nothing is there.
    async fn clear(&self, path: &PathDescriptor) -> Result<()>;

    /// Whole-category documents for every built-in and registered category.
    ///
    /// Categories with nothing stored are skipped.
    async fn export_all(
        &self,
        scope_id: &str,
        registry: &CategoryRegistry,
    ) -> Result<Vec<CategoryExport>> {
        let categories: Vec<Category> = Category::BUILTIN
            .into_iter()
            .chain(registry.custom_categories())
            .collect();

        let mut exported = Vec::new();
        for category in categories {
            let path = PathDescriptor::root(scope_id, category.clone());
            match self.get(&path).await {
                Ok(data) => exported.push((category, data)),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(
            driver = self.name(),
            scope = scope_id,
            categories = exported.len(),
            "export complete"
        );
        Ok(exported)
    }

    /// Write exported documents back as individually addressable records.
    ///
    /// Each category is split to its nesting depth and written with one `set`
    /// per entity. A category with no known depth or malformed nesting is
    /// skipped and reported; backend errors abort the import.
    async fn import_all(
        &self,
        scope_id: &str,
        records: Vec<CategoryExport>,
        registry: &CategoryRegistry,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for (category, data) in records {
            let split = registry
                .depth_of(&category)
                .and_then(|depth| split_primary_key(&category, depth, data));
            let entries = match split {
                Ok(entries) => entries,
                Err(e) if e.is_category_scoped() => {
                    tracing::warn!(
                        driver = self.name(),
                        category = %category,
                        error = %e,
                        "skipping category during import"
                    );
                    report.skipped.push((category, e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            for (primary_key, value) in entries {
                let path =
                    PathDescriptor::new(scope_id, category.clone(), primary_key, Vec::<String>::new());
                self.set(&path, value).await?;
                report.records_written += 1;
            }
            report.imported.push(category);
        }

        tracing::debug!(
            driver = self.name(),
            scope = scope_id,
            written = report.records_written,
            skipped = report.skipped.len(),
            "import complete"
        );
        Ok(report)
    }
}
