//! Convenient imports for confstore.
//!
//! ```ignore
//! use confstore::prelude::*;
//!
//! let store = Store::new("my-cog", Arc::new(MemoryDriver::new()));
//! ```

// Main entry point
pub use crate::{AtomicSession, Store, StoreBuilder, StoreOptions};

// Error handling
pub use crate::{Error, Result};

// Addressing
pub use crate::{Category, CategoryRegistry, ConflictMode, PathDescriptor, Value};

// Storage engines
pub use crate::{CategoryExport, Driver, ImportReport, JsonDriver, MemoryDriver};

// Re-export for convenience
pub use serde_json::json;
pub use std::sync::Arc;
