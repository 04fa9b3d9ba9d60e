//! Primary error enum for registry operations.

use std::path::PathBuf;

use thiserror::Error;

use super::aggregate::AggregatedErrors;
use crate::parser::{DecodeFailure, render_failures};

/// Errors that can occur while feeding or draining a configuration store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A configuration file was missing or could not be read.
    #[error("configuration source '{path}' is unreadable: {source}")]
    SourceUnreadable {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// None of the content decoders accepted the input.
    #[error("could not parse {origin}: {}", render_failures(.failures))]
    ParseFailed {
        /// Human-readable description of where the content came from.
        origin: String,
        /// One entry per decoder that was attempted, in priority order.
        failures: Vec<DecodeFailure>,
    },

    /// An in-memory tree was neither a map nor a sequence.
    #[error("{origin} is not a map or sequence")]
    NotStructured {
        /// Description of the offending source.
        origin: String,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as supplied by the caller.
        pattern: String,
        /// Underlying compilation failure.
        #[source]
        source: globset::Error,
    },

    /// The binary codec failed to encode a tree.
    #[error("failed to encode configuration tree: {0}")]
    Encode(#[source] bincode::Error),

    /// A tree could not be converted to or from a typed or textual form.
    #[error("failed to serialise configuration: {message}")]
    Serialize {
        /// Description of the failure reported by the codec.
        message: String,
    },

    /// Multiple errors occurred while processing one batch of sources.
    #[error("multiple configuration errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

impl RegistryError {
    /// Returns `true` when the error (or any aggregated member) is a parse
    /// failure.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        match self {
            Self::ParseFailed { .. } => true,
            Self::Aggregate(errors) => errors.iter().any(Self::is_parse_failure),
            _ => false,
        }
    }
}
