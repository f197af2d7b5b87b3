//! Nested-document helpers shared by the reference engines
//!
//! A document is a JSON object tree. Nodes are addressed by a list of
//! segments, each selecting a key of an object one level down.

use confstore_core::{Error, PathDescriptor};
use serde_json::{Map, Value};

/// Outcome of an insert that could not be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarParent {
    /// Number of leading segments addressing the scalar node in the way.
    /// Zero means the document root itself is not an object.
    pub prefix_len: usize,
}

impl ScalarParent {
    /// Segments addressing the scalar node
    pub fn ancestor<'s, 'a>(&self, segments: &'s [&'a str]) -> &'s [&'a str] {
        &segments[..self.prefix_len.min(segments.len())]
    }

    /// Error for a rejected write to `path`, naming the scalar ancestor.
    ///
    /// Expects the failure to come from inserting at `path.scoped_segments()`.
    pub fn into_error(self, path: &PathDescriptor) -> Error {
        let segments = path.scoped_segments();
        let ancestor = std::iter::once(path.scope_id())
            .chain(self.ancestor(&segments).iter().copied())
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Error::ScalarParent {
            path: path.to_string(),
            ancestor,
        }
    }
}

/// Empty document
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Node at `segments`, if every step exists and every parent is an object.
pub fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(*segment))
}

/// Store `value` at `segments`, creating missing parents as empty objects.
///
/// An empty segment list replaces the whole document.
pub fn insert(root: &mut Value, segments: &[&str], value: Value) -> Result<(), ScalarParent> {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut node = root;
    for (prefix_len, segment) in parents.iter().enumerate() {
        let map = node.as_object_mut().ok_or(ScalarParent { prefix_len })?;
        node = map.entry(segment.to_string()).or_insert_with(empty);
    }
    let map = node.as_object_mut().ok_or(ScalarParent {
        prefix_len: parents.len(),
    })?;
    map.insert(last.to_string(), value);
    Ok(())
}

/// Remove the subtree at `segments`; returns whether anything was removed.
///
/// An empty segment list empties the whole document. Parents left empty are
/// kept.
pub fn remove(root: &mut Value, segments: &[&str]) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        let had_data = root.as_object().map_or(true, |m| !m.is_empty());
        *root = empty();
        return had_data;
    };

    let mut node = root;
    for segment in parents {
        match node.as_object_mut().and_then(|m| m.get_mut(*segment)) {
            Some(child) => node = child,
            None => return false,
        }
    }
    node.as_object_mut()
        .map_or(false, |m| m.remove(*last).is_some())
}
