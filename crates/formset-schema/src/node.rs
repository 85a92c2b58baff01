//! Property-path access to schema nodes
//!
//! Logic actions address schema properties by dotted path (`hidden`,
//! `validate.required`, `components.0.label`). Typed schemas are edited by
//! going through their JSON form, so unknown properties are reachable too.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::Result;

/// Anything a logic action can mutate
pub trait SchemaNode {
    /// Read the value at a dotted path
    fn property(&self, path: &str) -> Option<Value>;

    /// Write the value at a dotted path, returning whether anything changed
    fn set_property(&mut self, path: &str, value: Value) -> Result<bool>;

    /// Shallow-merge top-level properties
    fn merge_schema(&mut self, patch: &Map<String, Value>) -> Result<bool> {
        let mut changed = false;
        for (key, value) in patch {
            changed = self.set_property(key, value.clone())? || changed;
        }
        Ok(changed)
    }
}

/// Loose truthiness used for flags set by logic (`"true"`, `1`, ...)
pub fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "false"),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(SchemaError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

pub(crate) fn get_path(doc: &Value, path: &str) -> Option<Value> {
    let segments = split_path(path).ok()?;
    let mut current = doc;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

/// Set `value` at `path`, creating intermediate objects as needed
pub(crate) fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<bool> {
    let segments = split_path(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| SchemaError::InvalidPath(path.to_string()))?;

    let mut current = doc;
    for segment in parents {
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| SchemaError::InvalidPath(path.to_string()))?;
                items
                    .get_mut(index)
                    .ok_or_else(|| SchemaError::InvalidPath(path.to_string()))?
            }
            _ => return Err(SchemaError::InvalidPath(path.to_string())),
        };
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
    }

    match current {
        Value::Object(map) => {
            if map.get(*last) == Some(&value) {
                return Ok(false);
            }
            map.insert(last.to_string(), value);
            Ok(true)
        }
        Value::Array(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get_mut(index))
                .ok_or_else(|| SchemaError::InvalidPath(path.to_string()))?;
            if *slot == value {
                return Ok(false);
            }
            *slot = value;
            Ok(true)
        }
        _ => Err(SchemaError::InvalidPath(path.to_string())),
    }
}

/// Read a property of any serializable schema
pub(crate) fn property_of<T: Serialize>(node: &T, path: &str) -> Option<Value> {
    let doc = serde_json::to_value(node).ok()?;
    get_path(&doc, path)
}

/// Write a property of any serializable schema by round-tripping through JSON
pub(crate) fn set_property_of<T>(node: &mut T, path: &str, value: Value) -> Result<bool>
where
    T: Serialize + DeserializeOwned,
{
    let mut doc = serde_json::to_value(&*node)?;
    if !set_path(&mut doc, path, value)? {
        return Ok(false);
    }
    *node = serde_json::from_value(doc)?;
    Ok(true)
}
