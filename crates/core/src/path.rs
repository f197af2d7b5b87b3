//! Path descriptors
//!
//! A [`PathDescriptor`] addresses one node of the namespace tree:
//!
//! ```text
//! scope_id / category / primary_key... / sub_keys...
//! ```
//!
//! Descriptors are immutable. Extending one with [`PathDescriptor::with_sub_keys`]
//! returns a new descriptor. The flattened form (empty segments dropped) is the
//! canonical key used for both locking and storage, so equality and hashing
//! are defined on it.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Immutable address of a node in the hierarchical namespace.
///
/// # Examples
///
/// ```
/// use confstore_core::{Category, PathDescriptor};
///
/// let path = PathDescriptor::new("cog", Category::Member, ["111", "222"], ["xp"]);
/// assert_eq!(path.flatten(), vec!["cog", "MEMBER", "111", "222", "xp"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathDescriptor {
    scope_id: String,
    category: Category,
    primary_key: Vec<String>,
    sub_keys: Vec<String>,
}

impl PathDescriptor {
    /// Create a descriptor. Segments are opaque and not validated.
    pub fn new<P, S>(
        scope_id: impl Into<String>,
        category: Category,
        primary_key: P,
        sub_keys: S,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            scope_id: scope_id.into(),
            category,
            primary_key: primary_key.into_iter().map(Into::into).collect(),
            sub_keys: sub_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Descriptor for a whole category: no primary key, no sub-keys.
    pub fn root(scope_id: impl Into<String>, category: Category) -> Self {
        Self {
            scope_id: scope_id.into(),
            category,
            primary_key: Vec::new(),
            sub_keys: Vec::new(),
        }
    }

    /// Owning scope (tenant) id
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Category of the addressed entity
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Primary-key segments
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Sub-key segments
    pub fn sub_keys(&self) -> &[String] {
        &self.sub_keys
    }

    /// Whether the category is caller-registered
    pub fn is_custom(&self) -> bool {
        self.category.is_custom()
    }

    /// New descriptor with `segments` appended to the sub-keys.
    pub fn with_sub_keys<I>(&self, segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut next = self.clone();
        next.sub_keys.extend(segments.into_iter().map(Into::into));
        next
    }

    /// New descriptor with dynamically typed segments appended to the sub-keys.
    ///
    /// Every segment must be a JSON string; otherwise fails with
    /// [`Error::InvalidSegment`] and nothing is appended.
    pub fn try_with_sub_keys<I>(&self, segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| match segment {
                Value::String(s) => Ok(s),
                other => Err(Error::InvalidSegment {
                    index,
                    found: other.to_string(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_sub_keys(segments))
    }

    /// New descriptor with a different primary key and no sub-keys.
    pub fn with_primary_key<I>(&self, primary_key: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            scope_id: self.scope_id.clone(),
            category: self.category.clone(),
            primary_key: primary_key.into_iter().map(Into::into).collect(),
            sub_keys: Vec::new(),
        }
    }

    /// Ordered non-empty segments: `[scope_id, category, *primary_key, *sub_keys]`.
    pub fn flatten(&self) -> Vec<&str> {
        std::iter::once(self.scope_id.as_str())
            .chain(std::iter::once(self.category.as_str()))
            .chain(self.primary_key.iter().map(String::as_str))
            .chain(self.sub_keys.iter().map(String::as_str))
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Non-empty segments below the scope: `[category, *primary_key, *sub_keys]`.
    ///
    /// Backends that partition storage by scope address nodes with this.
    pub fn scoped_segments(&self) -> Vec<&str> {
        std::iter::once(self.category.as_str())
            .chain(self.primary_key.iter().map(String::as_str))
            .chain(self.sub_keys.iter().map(String::as_str))
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Owned variant of [`PathDescriptor::flatten`]
    pub fn flatten_owned(&self) -> Vec<String> {
        self.flatten().into_iter().map(str::to_string).collect()
    }
}

impl PartialEq for PathDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.flatten() == other.flatten()
    }
}

impl Eq for PathDescriptor {}

impl Hash for PathDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.flatten().hash(state);
    }
}

/// Formats as `scope/CATEGORY/pk.../sub...`
impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flatten().join("/"))
    }
}
