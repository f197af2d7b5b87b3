//! Store configuration.
//!
//! [`StoreOptions`] can be built in code or deserialized from JSON:
//!
//! ```
//! use confstore::{ConflictMode, StoreOptions};
//!
//! let opts = StoreOptions::from_json(
//!     r#"{"conflict_mode": "ordered_prefix", "custom_categories": {"PLAYLIST": 2}}"#,
//! ).unwrap();
//! assert_eq!(opts.conflict_mode, ConflictMode::OrderedPrefix);
//! assert_eq!(opts.custom_categories["PLAYLIST"], 2);
//! ```

use confstore_concurrency::ConflictMode;
use confstore_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for opening a [`Store`](crate::Store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// How overlapping paths are detected by the lock manager
    pub conflict_mode: ConflictMode,
    /// Custom categories registered when the store is built, name to depth
    pub custom_categories: BTreeMap<String, usize>,
}

impl StoreOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the conflict mode
    pub fn conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.conflict_mode = mode;
        self
    }

    /// Add a custom category to register at build time
    pub fn custom_category(mut self, name: impl Into<String>, depth: usize) -> Self {
        self.custom_categories.insert(name.into(), depth);
        self
    }
}
