//! Constructors and aggregation helpers for `RegistryError`.

use std::path::Path;
use std::sync::Arc;

use super::{AggregatedErrors, RegistryError};
use crate::parser::DecodeFailure;

impl RegistryError {
    /// Tries to build a [`RegistryError`] from an iterator of errors.
    ///
    /// The iterator is consumed eagerly. It returns:
    /// * `None` when no errors are supplied;
    /// * the inner error when a single [`Arc`] is uniquely owned;
    /// * [`Self::Aggregate`] holding that [`Arc`] when it is already shared; and
    /// * [`Self::Aggregate`] combining every error for two or more inputs.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.len() > 1 {
            return Some(Self::Aggregate(Box::new(AggregatedErrors::new(arcs))));
        }
        let last = arcs.pop()?;
        Some(match Arc::try_unwrap(last) {
            Ok(err) => err,
            Err(shared) => Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared]))),
        })
    }

    /// Build a [`RegistryError`] from at least one error.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty. Use [`RegistryError::try_aggregate`] when
    /// the list may be empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        Self::try_aggregate(errors).map_or_else(
            || panic!("aggregate requires at least one error"),
            |err| err,
        )
    }

    /// Construct a shared [`RegistryError::SourceUnreadable`].
    #[must_use]
    pub fn unreadable(path: &Path, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Construct a shared [`RegistryError::ParseFailed`].
    #[must_use]
    pub fn parse_failed(origin: impl Into<String>, failures: Vec<DecodeFailure>) -> Arc<Self> {
        Arc::new(Self::ParseFailed {
            origin: origin.into(),
            failures,
        })
    }

    /// Construct a shared [`RegistryError::NotStructured`].
    #[must_use]
    pub fn not_structured(origin: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::NotStructured {
            origin: origin.into(),
        })
    }

    /// Construct a shared [`RegistryError::Serialize`] from any displayable
    /// codec error.
    #[must_use]
    pub fn serialize(err: impl std::fmt::Display) -> Arc<Self> {
        Arc::new(Self::Serialize {
            message: err.to_string(),
        })
    }
}

impl From<bincode::Error> for RegistryError {
    fn from(source: bincode::Error) -> Self {
        Self::Encode(source)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize {
            message: format!("JSON error: {e} at line {}, column {}", e.line(), e.column()),
        }
    }
}

impl From<serde_yaml::Error> for RegistryError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialize {
            message: format!("YAML error: {e}"),
        }
    }
}
