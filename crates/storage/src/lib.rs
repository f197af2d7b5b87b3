//! Storage layer for confstore
//!
//! This crate implements the backend side of the store with:
//! - Driver: CRUD contract keyed by path descriptor, plus bulk export/import
//! - split_primary_key: nested category document -> addressable records
//! - MemoryDriver: in-process engine
//! - JsonDriver: one JSON document per scope on disk

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod driver;
pub mod json;
pub mod memory;
pub mod split;
pub mod tree;

pub use driver::{CategoryExport, Driver, ImportReport};
pub use json::JsonDriver;
pub use memory::MemoryDriver;
pub use split::{split_primary_key, SplitRecord};
