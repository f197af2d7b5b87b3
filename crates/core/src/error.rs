//! Error types for confstore.
//!
//! One error enum is shared by the path, storage and facade layers. The
//! concurrency layer never fails; it only suspends.

use thiserror::Error;

/// All confstore errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No value is stored at exactly the requested path
    #[error("not found: {path}")]
    NotFound {
        /// Rendered path that was looked up
        path: String,
    },

    /// A dynamically supplied path segment was not a string
    #[error("invalid segment at position {index}: expected string, got {found}")]
    InvalidSegment {
        /// Position of the offending segment in the supplied list
        index: usize,
        /// JSON rendering of the offending value
        found: String,
    },

    /// Category has neither a built-in nor a registered depth
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Category name cannot address a namespace partition
    #[error("invalid category name {0:?}")]
    InvalidCategory(String),

    /// Attempted to register a built-in category name as custom
    #[error("category {0} is built in and cannot be registered")]
    ReservedCategory(String),

    /// Import data does not nest as deep as its category requires
    #[error("malformed record for category {category}: {reason}")]
    MalformedRecord {
        /// Category being imported
        category: String,
        /// What was wrong with the record
        reason: String,
    },

    /// Write attempted beneath a node that holds a scalar value
    #[error("cannot write {path}: {ancestor} holds a scalar value")]
    ScalarParent {
        /// Rendered path of the rejected write
        path: String,
        /// Rendered path of the scalar node in the way
        ancestor: String,
    },

    /// I/O error from a persistent backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error from a persistent backend
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for confstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::NotFound`] for a rendered path.
    pub fn not_found(path: impl ToString) -> Self {
        Error::NotFound {
            path: path.to_string(),
        }
    }

    /// Check if this is a not-found error.
    ///
    /// Not-found is expected during export and defaulted lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error only affects the category being imported.
    ///
    /// Such errors abort that category while the rest of an import continues.
    pub fn is_category_scoped(&self) -> bool {
        matches!(
            self,
            Error::UnknownCategory(_) | Error::MalformedRecord { .. }
        )
    }

    /// Check if this error came from the backend itself.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Serialization(_) | Error::Backend(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
