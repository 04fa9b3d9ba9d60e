//! Slash-delimited lookup with nearest-ancestor fallback.
//!
//! A path such as `console/timeZone` is walked from the root. When the walk
//! completes, the exact value wins. When a segment is missing, the lookup
//! falls back to the deepest `timeZone` held directly by a visited node.
//! Only when no visited node holds one does it take the deepest `timeZone`
//! found in a visited node's child maps.

use serde_json::{Map, Value};

use crate::tree::ConfigTree;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Resolve `path` against `tree`.
///
/// Returns `None` when neither the full path nor any fallback candidate
/// exists. Empty segments are ignored, so `/a//b/` is the same as `a/b`.
///
/// # Examples
///
/// ```
/// use confstore::path::resolve;
/// use serde_json::json;
///
/// let tree = json!({
///     "log": {"timeZone": "Europe/Berlin"},
///     "console": {"level": "INFO"},
/// });
/// assert_eq!(resolve(&tree, "console/timeZone"), Some(&json!("Europe/Berlin")));
/// assert_eq!(resolve(&tree, "console/level"), Some(&json!("INFO")));
/// assert_eq!(resolve(&tree, "missing"), None);
/// ```
#[must_use]
pub fn resolve<'t>(tree: &'t ConfigTree, path: &str) -> Option<&'t ConfigTree> {
    let segments: Vec<&str> = path
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [] => None,
        [key] => tree.as_object()?.get(*key),
        [.., last] => walk(tree, &segments, last),
    }
}

fn walk<'t>(tree: &'t ConfigTree, segments: &[&str], last: &str) -> Option<&'t ConfigTree> {
    let mut node = tree;
    let mut inherited = None;
    let mut nearby = None;
    for segment in segments {
        let Value::Object(map) = node else {
            return inherited.or(nearby);
        };
        match map.get(last) {
            Some(own) => inherited = Some(own),
            None => {
                if let Some(found) = child_entry(map, last) {
                    nearby = Some(found);
                }
            }
        }
        match map.get(*segment) {
            Some(next) => node = next,
            None => return inherited.or(nearby),
        }
    }
    Some(node)
}

/// The first `last` entry held by one of `map`'s child maps.
fn child_entry<'t>(map: &'t Map<String, Value>, last: &str) -> Option<&'t ConfigTree> {
    map.values()
        .filter_map(Value::as_object)
        .find_map(|child| child.get(last))
}
