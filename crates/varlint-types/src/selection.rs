//! Selection items: what a path resolves to.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One concrete resolution of a path expression against a tree.
///
/// `value` is None when the path does not exist in the tree; a present
/// `null` is `Some(Value::Null)`. `captures` holds the key chosen at each
/// wildcard segment of the expression, in expression order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub path: String,
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<String>,
}

impl SelectionItem {
    pub fn new(path: impl Into<String>, value: Option<Value>, captures: Vec<String>) -> Self {
        Self {
            path: path.into(),
            value,
            captures,
        }
    }

    /// True if the path exists in the tree.
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }

    /// The value bound to `item` when a predicate runs: absent becomes "".
    pub fn predicate_value(&self) -> Value {
        self.value
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }
}
