//! Core types for confstore
//!
//! This crate defines the fundamental types used throughout the system:
//! - [`PathDescriptor`]: Immutable address of a node in the hierarchical namespace
//! - [`Category`]: Top-level namespace partition (built-in or custom)
//! - [`CategoryRegistry`]: Nesting depths of caller-registered categories
//! - [`Error`]: Error taxonomy shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod error;
pub mod path;

pub use category::{Category, CategoryRegistry};
pub use error::{Error, Result};
pub use path::PathDescriptor;

/// Stored values are plain JSON trees.
pub type Value = serde_json::Value;
