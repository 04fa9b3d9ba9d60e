//! Error types produced while ingesting, parsing and exporting configuration.

mod aggregate;
mod constructors;
mod types;

pub use aggregate::AggregatedErrors;
pub use types::RegistryError;
