//! Primary-key splitting for bulk import
//!
//! An export holds one nested document per category. Importing it means
//! descending `depth` mapping layers and turning every node reached at that
//! depth into its own record, keyed by the mapping keys traversed on the way:
//!
//! ```text
//! depth 2:  {"g1": {"u1": A, "u2": B}, "g2": {"u3": C}}
//!        -> [(["g1","u1"], A), (["g1","u2"], B), (["g2","u3"], C)]
//! ```

use confstore_core::{Category, Error, Result, Value};

/// One addressable record: primary-key segments plus the value stored there
pub type SplitRecord = (Vec<String>, Value);

/// Split a whole-category document into per-entity records.
///
/// Depth 0 yields the document itself under an empty primary key. For deeper
/// categories every layer above the leaves must be a mapping; otherwise fails
/// with [`Error::MalformedRecord`]. Empty mappings yield no records.
pub fn split_primary_key(category: &Category, depth: usize, data: Value) -> Result<Vec<SplitRecord>> {
    if depth == 0 {
        return Ok(vec![(Vec::new(), data)]);
    }
    let mut records = Vec::new();
    let mut prefix = Vec::with_capacity(depth);
    descend(category, depth, data, &mut prefix, &mut records)?;
    Ok(records)
}

fn descend(
    category: &Category,
    remaining: usize,
    data: Value,
    prefix: &mut Vec<String>,
    records: &mut Vec<SplitRecord>,
) -> Result<()> {
    let map = match data {
        Value::Object(map) => map,
        other => {
            return Err(Error::MalformedRecord {
                category: category.to_string(),
                reason: format!(
                    "expected a mapping below primary key {:?}, found {}",
                    prefix,
                    kind(&other)
                ),
            })
        }
    };

    for (key, value) in map {
        prefix.push(key);
        if remaining > 1 {
            descend(category, remaining - 1, value, prefix, records)?;
        } else {
            records.push((prefix.clone(), value));
        }
        prefix.pop();
    }
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
