//! The error list carried by [`RegistryError::Aggregate`].

use std::{error::Error, fmt, sync::Arc};

use super::RegistryError;

/// Every source skipped by one call to `integrate`, in batch order.
///
/// ```
/// use confstore::{ConfigStore, RegistryError, Source};
///
/// let mut store = ConfigStore::new();
/// let report = store.integrate([
///     Source::file("/missing/app.yaml"),
///     Source::text("retries: 3"),
///     Source::text("not configuration"),
/// ]);
/// let Err(err) = report.into_result() else {
///     panic!("two sources should have been skipped");
/// };
/// let RegistryError::Aggregate(skipped) = &*err else {
///     panic!("expected an aggregate, got {err}");
/// };
/// assert_eq!(skipped.len(), 2);
/// assert!(skipped.iter().any(RegistryError::is_parse_failure));
/// assert!(skipped.to_string().starts_with("1: configuration source"));
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<Arc<RegistryError>>);

impl AggregatedErrors {
    /// Wrap the failures of one batch.
    #[must_use]
    pub const fn new(errors: Vec<Arc<RegistryError>>) -> Self {
        Self(errors)
    }

    /// The skipped sources' errors, in batch order.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &RegistryError> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Number of skipped sources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing was skipped.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One numbered line per skipped source.
impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.iter().enumerate();
        if let Some((_, first)) = lines.next() {
            write!(f, "1: {first}")?;
        }
        for (index, err) in lines {
            write!(f, "\n{}: {err}", index + 1)?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}
