//! Protected-key filtering.
//!
//! A protected set is a tree whose key paths mark configuration that later
//! merges may not overwrite. [`mask`] strips those paths from an incoming
//! fragment before it is merged, so whatever the store already holds at a
//! protected path survives.

use serde_json::{Map, Value};

use crate::tree::ConfigTree;

/// Remove every key from `incoming` that `protected` marks at the same path.
///
/// Where both trees hold a map at a key the filter recurses; where
/// `protected` holds anything else the key is dropped from `incoming`
/// entirely. Non-map fragments are returned unchanged.
///
/// # Examples
///
/// ```
/// use confstore::mask::mask;
/// use serde_json::json;
///
/// let protected = json!({"a": {"b": true}});
/// let filtered = mask(&protected, json!({"a": {"b": 99, "c": 1}, "d": 2}));
/// assert_eq!(filtered, json!({"a": {"c": 1}, "d": 2}));
/// ```
#[must_use]
pub fn mask(protected: &ConfigTree, incoming: ConfigTree) -> ConfigTree {
    match (protected, incoming) {
        (Value::Object(guarded), Value::Object(map)) => Value::Object(mask_object(guarded, map)),
        (_, other) => other,
    }
}

fn mask_object(guarded: &Map<String, Value>, incoming: Map<String, Value>) -> Map<String, Value> {
    incoming
        .into_iter()
        .filter_map(|(key, value)| match guarded.get(&key) {
            None => Some((key, value)),
            Some(nested @ Value::Object(_)) if value.is_object() => {
                Some((key, mask(nested, value)))
            }
            Some(_) => None,
        })
        .collect()
}
