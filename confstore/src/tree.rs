//! The generic configuration tree.
//!
//! Configuration is held as a [`serde_json::Value`] built with the
//! `preserve_order` feature, so maps remember first-insertion order. Scalars
//! are `Null`, `Bool`, `Number` and `String`; sequences are `Array`; maps are
//! `Object`.

use serde_json::{Map, Value};

/// A recursively defined configuration value.
pub type ConfigTree = Value;

/// Ordered map node of a [`ConfigTree`].
pub type ConfigMap = Map<String, Value>;

/// Returns `true` for trees that carry no configuration: `null`, an empty map
/// or an empty sequence.
///
/// # Examples
///
/// ```
/// use confstore::tree::is_empty_tree;
/// use serde_json::json;
///
/// assert!(is_empty_tree(&json!(null)));
/// assert!(is_empty_tree(&json!({})));
/// assert!(!is_empty_tree(&json!({"a": 1})));
/// assert!(!is_empty_tree(&json!(0)));
/// ```
#[must_use]
pub fn is_empty_tree(tree: &ConfigTree) -> bool {
    match tree {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

/// Returns `true` when `tree` is a map or a sequence with at least one entry.
#[must_use]
pub fn is_populated_structure(tree: &ConfigTree) -> bool {
    match tree {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

/// Returns an empty map node.
#[must_use]
pub fn empty_tree() -> ConfigTree {
    Value::Object(Map::new())
}
