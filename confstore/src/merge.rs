//! Deep merge of configuration trees.
//!
//! Maps merge key-by-key and recursively; every other kind of value (scalar
//! or sequence) replaces what was there. Sequences are never concatenated or
//! merged element-wise, which keeps `merge(t, t) == t` for every tree.

use serde_json::{Map, Value};

use crate::tree::{ConfigTree, is_empty_tree};

/// Merge `incoming` over `base`, returning the combined tree.
///
/// When `base` is empty the result is `incoming` verbatim, key order
/// included.
///
/// # Examples
///
/// ```
/// use confstore::merge::merge;
/// use serde_json::json;
///
/// let merged = merge(
///     json!({"a": 1, "b": {"x": 1}}),
///     json!({"b": {"y": 2}, "c": 3}),
/// );
/// assert_eq!(merged, json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3}));
///
/// // Sequences replace existing values.
/// let replaced = merge(merged, json!({"b": [1, 2, 3]}));
/// assert_eq!(replaced["b"], json!([1, 2, 3]));
/// ```
#[must_use]
pub fn merge(mut base: ConfigTree, incoming: ConfigTree) -> ConfigTree {
    merge_into(&mut base, incoming);
    base
}

/// Overlay `incoming` onto `target` in place.
///
/// Behaviour:
/// - An empty `target` is replaced by `incoming` wholesale.
/// - Two maps merge recursively: existing keys are updated in place, new keys
///   are appended.
/// - Any other pairing replaces `target` with `incoming`.
pub fn merge_into(target: &mut ConfigTree, incoming: ConfigTree) {
    if is_empty_tree(target) {
        *target = incoming;
        return;
    }
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(map)) => merge_object(target_map, map),
        (slot, other) => *slot = other,
    }
}

/// Merge the map `incoming` into `target_map`.
///
/// Only pairs of maps recurse; any other value overwrites or inserts.
fn merge_object(target_map: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match target_map.get_mut(&key) {
            Some(existing @ Value::Object(_)) if value.is_object() => merge_into(existing, value),
            Some(existing) => *existing = value,
            None => {
                target_map.insert(key, value);
            }
        }
    }
}
