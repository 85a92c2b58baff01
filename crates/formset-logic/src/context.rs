//! Evaluation context
//!
//! Everything a condition or trigger may read is passed in explicitly; the
//! evaluator never walks up a component tree looking for its form.

use serde_json::Value;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Root submission data
    pub data: &'a Value,
    /// Data of the enclosing row (equal to `data` outside of grids)
    pub row: &'a Value,
    /// The full form definition
    pub form: &'a Value,
    /// Key of the component the evaluation is for
    pub component_key: &'a str,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            data,
            row: data,
            form: &NULL,
            component_key: "",
        }
    }

    pub fn with_row(mut self, row: &'a Value) -> Self {
        self.row = row;
        self
    }

    pub fn with_form(mut self, form: &'a Value) -> Self {
        self.form = form;
        self
    }

    pub fn with_component_key(mut self, key: &'a str) -> Self {
        self.component_key = key;
        self
    }

    /// Resolve a key the way conditionals do: the row first, then the root data
    pub fn value_of(&self, key: &str) -> Option<&'a Value> {
        lookup_path(self.row, key).or_else(|| lookup_path(self.data, key))
    }
}

/// Look up a dotted path (`address.city`, `items.0`) in a data object
pub fn lookup_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
