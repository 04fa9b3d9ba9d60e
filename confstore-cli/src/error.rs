//! Error types for `confstore`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use confstore::RegistryError;
use thiserror::Error;

/// Errors surfaced by the `confstore` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The registry failed to export.
    #[error(transparent)]
    Registry(#[from] Arc<RegistryError>),

    /// A looked-up value could not be rendered as JSON.
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A looked-up value could not be rendered as YAML.
    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The export target is not a file path.
    #[error("output path '{0}' does not name a file")]
    InvalidOutput(Utf8PathBuf),

    /// Writing the export file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being written.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    Stdout(#[source] std::io::Error),

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
