//! Namespace categories
//!
//! A category is the top-level partition below a scope. It fixes how many
//! primary-key segments an entity needs:
//!
//! | Category | Tag | Depth |
//! |----------|-----|-------|
//! | Global | `GLOBAL` | 0 |
//! | Guild | `GUILD` | 1 |
//! | Channel | `TEXTCHANNEL` | 1 |
//! | Role | `ROLE` | 1 |
//! | User | `USER` | 1 |
//! | Member | `MEMBER` | 2 |
//! | Custom | registered name | registered depth |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level namespace partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Scope-wide settings, no primary key
    Global,
    /// Per-guild settings
    Guild,
    /// Per-channel settings
    Channel,
    /// Per-role settings
    Role,
    /// Per-user settings
    User,
    /// Per-member settings, keyed by guild then user
    Member,
    /// Caller-registered category
    Custom(String),
}

impl Category {
    /// Built-in categories in export order.
    pub const BUILTIN: [Category; 6] = [
        Category::Global,
        Category::Guild,
        Category::Channel,
        Category::Role,
        Category::User,
        Category::Member,
    ];

    /// Resolve a tag into a category.
    ///
    /// Any tag that is not a built-in becomes [`Category::Custom`]; whether it
    /// is registered is checked later against a [`CategoryRegistry`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "GLOBAL" => Category::Global,
            "GUILD" => Category::Guild,
            "TEXTCHANNEL" => Category::Channel,
            "ROLE" => Category::Role,
            "USER" => Category::User,
            "MEMBER" => Category::Member,
            other => Category::Custom(other.to_string()),
        }
    }

    /// Tag used as the category's path segment.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Global => "GLOBAL",
            Category::Guild => "GUILD",
            Category::Channel => "TEXTCHANNEL",
            Category::Role => "ROLE",
            Category::User => "USER",
            Category::Member => "MEMBER",
            Category::Custom(name) => name,
        }
    }

    /// Whether this is a caller-registered category.
    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }

    /// Depth of a built-in category, `None` for custom ones.
    pub fn builtin_depth(&self) -> Option<usize> {
        match self {
            Category::Global => Some(0),
            Category::Guild | Category::Channel | Category::Role | Category::User => Some(1),
            Category::Member => Some(2),
            Category::Custom(_) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Category::from_tag(&tag)
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Category::from_tag(tag)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}

/// Nesting depths of caller-registered categories.
///
/// Owned by the registering collaborator and handed to bulk export/import.
/// Iteration order is sorted by name so exports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, usize>",
    into = "BTreeMap<String, usize>"
)]
pub struct CategoryRegistry {
    depths: BTreeMap<String, usize>,
}

impl CategoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a custom category with its depth.
    ///
    /// Built-in tags are rejected with [`Error::ReservedCategory`]. An empty
    /// name would address the whole scope and is rejected with
    /// [`Error::InvalidCategory`].
    pub fn register(&mut self, name: impl Into<String>, depth: usize) -> Result<Category> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidCategory(name));
        }
        let category = Category::from_tag(&name);
        if !category.is_custom() {
            return Err(Error::ReservedCategory(name));
        }
        if let Some(previous) = self.depths.insert(name.clone(), depth) {
            if previous != depth {
                tracing::debug!(category = %name, previous, depth, "custom category depth changed");
            }
        } else {
            tracing::debug!(category = %name, depth, "custom category registered");
        }
        Ok(category)
    }

    /// Whether a custom category with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.depths.contains_key(name)
    }

    /// Nesting depth of any category.
    ///
    /// Fails with [`Error::UnknownCategory`] for unregistered custom names.
    pub fn depth_of(&self, category: &Category) -> Result<usize> {
        if let Some(depth) = category.builtin_depth() {
            return Ok(depth);
        }
        self.depths
            .get(category.as_str())
            .copied()
            .ok_or_else(|| Error::UnknownCategory(category.as_str().to_string()))
    }

    /// Registered custom categories, sorted by name
    pub fn custom_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.depths.keys().map(|name| Category::Custom(name.clone()))
    }

    /// Number of registered custom categories
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Check if no custom category is registered
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

impl TryFrom<BTreeMap<String, usize>> for CategoryRegistry {
    type Error = Error;

    fn try_from(depths: BTreeMap<String, usize>) -> Result<Self> {
        let mut registry = Self::new();
        for (name, depth) in depths {
            registry.register(name, depth)?;
        }
        Ok(registry)
    }
}

impl From<CategoryRegistry> for BTreeMap<String, usize> {
    fn from(registry: CategoryRegistry) -> Self {
        registry.depths
    }
}
