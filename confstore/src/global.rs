//! Process-wide store instances.
//!
//! Two independent stores are available: [`global`] for configuration loaded
//! at start-up and [`overrides`] for values adjusted at runtime. Both are
//! created empty on first access and live for the rest of the process.
//! Readers take the read lock; [`ConfigStore::integrate`] and
//! [`ConfigStore::clear`] need the write lock.
//!
//! ```
//! use confstore::global;
//! use serde_json::json;
//!
//! let report = global::overrides()
//!     .write()
//!     .integrate([json!({"feature": {"beta": true}})]);
//! assert!(report.is_clean());
//! assert_eq!(
//!     global::overrides().read().get("feature/beta").cloned(),
//!     Some(json!(true))
//! );
//! ```

use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::ConfigStore;

static GLOBAL: LazyLock<RwLock<ConfigStore>> =
    LazyLock::new(|| RwLock::new(ConfigStore::new()));
static OVERRIDES: LazyLock<RwLock<ConfigStore>> =
    LazyLock::new(|| RwLock::new(ConfigStore::new()));

/// The process-wide store for static configuration.
#[must_use]
pub fn global() -> &'static RwLock<ConfigStore> {
    &GLOBAL
}

/// The process-wide store for runtime overrides.
#[must_use]
pub fn overrides() -> &'static RwLock<ConfigStore> {
    &OVERRIDES
}

#[cfg(test)]
mod tests {
    use super::{global, overrides};
    use serde_json::json;
    use serial_test::serial;

    #[test]
    #[serial]
    fn instances_are_independent() {
        global().write().clear();
        overrides().write().clear();

        let report = global().write().integrate([json!({"name": "global"})]);
        assert!(report.is_clean());

        assert_eq!(global().read().get("name"), Some(&json!("global")));
        assert!(overrides().read().is_empty());
        global().write().clear();
    }

    #[test]
    #[serial]
    fn repeated_access_returns_the_same_store() {
        assert!(std::ptr::eq(global(), global()));
        assert!(!std::ptr::eq(global(), overrides()));
    }
}
