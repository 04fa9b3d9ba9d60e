//! Named constants that YAML documents may reference with `!const Type::NAME`.
//!
//! The parser never inspects the program to find constants; callers inject a
//! [`ConstantResolver`]. [`ConstantRegistry`] is the stock implementation and
//! any `Fn(&str, &str) -> Option<ConfigTree>` closure works too.

use std::collections::HashMap;

use crate::tree::ConfigTree;

/// Separator between the owner and the constant name in a reference.
pub const REFERENCE_SEPARATOR: &str = "::";

/// Capability that maps `(owner, name)` pairs to configuration values.
pub trait ConstantResolver: Send + Sync {
    /// Look up the constant `name` registered under `owner`.
    fn resolve(&self, owner: &str, name: &str) -> Option<ConfigTree>;
}

impl<F> ConstantResolver for F
where
    F: Fn(&str, &str) -> Option<ConfigTree> + Send + Sync,
{
    fn resolve(&self, owner: &str, name: &str) -> Option<ConfigTree> {
        self(owner, name)
    }
}

/// Split a `Type::NAME` reference into its owner and name.
///
/// Returns `None` unless both halves are non-empty after trimming.
///
/// ```
/// use confstore::constants::split_reference;
///
/// assert_eq!(split_reference("Level::DEBUG"), Some(("Level", "DEBUG")));
/// assert_eq!(split_reference(" Level :: DEBUG "), Some(("Level", "DEBUG")));
/// assert_eq!(split_reference("DEBUG"), None);
/// assert_eq!(split_reference("::DEBUG"), None);
/// ```
#[must_use]
pub fn split_reference(reference: &str) -> Option<(&str, &str)> {
    let (owner, name) = reference.split_once(REFERENCE_SEPARATOR)?;
    let (owner_trimmed, name_trimmed) = (owner.trim(), name.trim());
    (!owner_trimmed.is_empty() && !name_trimmed.is_empty()).then_some((owner_trimmed, name_trimmed))
}

/// In-memory table of constants grouped by owner.
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    owners: HashMap<String, HashMap<String, ConfigTree>>,
}

impl ConstantRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` as `owner::name`, replacing any previous value.
    pub fn insert(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        value: ConfigTree,
    ) -> &mut Self {
        self.owners
            .entry(owner.into())
            .or_default()
            .insert(name.into(), value);
        self
    }

    /// Builder-style variant of [`ConstantRegistry::insert`].
    #[must_use]
    pub fn with(
        mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        value: ConfigTree,
    ) -> Self {
        self.insert(owner, name, value);
        self
    }

    /// Borrow the value registered as `owner::name`.
    #[must_use]
    pub fn get(&self, owner: &str, name: &str) -> Option<&ConfigTree> {
        self.owners.get(owner)?.get(name)
    }

    /// Number of registered constants across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.values().map(HashMap::len).sum()
    }

    /// Returns `true` when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConstantResolver for ConstantRegistry {
    fn resolve(&self, owner: &str, name: &str) -> Option<ConfigTree> {
        self.get(owner, name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstantRegistry, ConstantResolver};
    use serde_json::json;

    #[test]
    fn registry_resolves_registered_constants() {
        let registry = ConstantRegistry::new()
            .with("Level", "DEBUG", json!(100))
            .with("Level", "INFO", json!(200))
            .with("Zone", "DEFAULT", json!("UTC"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve("Level", "INFO"), Some(json!(200)));
        assert_eq!(registry.resolve("Zone", "DEFAULT"), Some(json!("UTC")));
        assert_eq!(registry.resolve("Level", "TRACE"), None);
        assert_eq!(registry.resolve("Missing", "DEBUG"), None);
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut registry = ConstantRegistry::new();
        registry.insert("Level", "DEBUG", json!(1)).insert("Level", "DEBUG", json!(2));
        assert_eq!(registry.get("Level", "DEBUG"), Some(&json!(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn closures_act_as_resolvers() {
        let resolver = |owner: &str, name: &str| {
            (owner == "Env" && name == "HOME").then(|| json!("/home/app"))
        };
        assert_eq!(resolver.resolve("Env", "HOME"), Some(json!("/home/app")));
        assert_eq!(resolver.resolve("Env", "PATH"), None);
    }
}
