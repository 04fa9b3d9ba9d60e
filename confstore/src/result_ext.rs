//! Extension for mapping foreign errors into `RegistryResult` concisely.
//!
//! Replaces repetitive `.map_err(|e| Arc::new(RegistryError::from(e)))` at
//! call sites that talk to the JSON, YAML and binary codecs.
//!
//! ```
//! use confstore::{RegistryResult, RegistryResultExt};
//!
//! fn render() -> RegistryResult<String> {
//!     serde_json::to_string(&serde_json::json!({"port": 8080})).into_registry()
//! }
//! # assert!(render().is_ok());
//! ```

use std::sync::Arc;

use crate::{RegistryError, RegistryResult};

/// Generic extension for mapping any `Result<T, E>` with
/// `E: Into<RegistryError>` into a [`RegistryResult<T>`].
pub trait RegistryResultExt<T, E> {
    /// Convert `Result<T, E>` into `RegistryResult<T>` using
    /// `Into<RegistryError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into
    /// `Arc<RegistryError>`.
    fn into_registry(self) -> RegistryResult<T>;
}

impl<T, E> RegistryResultExt<T, E> for Result<T, E>
where
    E: Into<RegistryError>,
{
    fn into_registry(self) -> RegistryResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}
