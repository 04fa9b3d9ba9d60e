//! A hierarchical configuration registry.
//!
//! [`ConfigStore`] ingests configuration fragments from in-memory trees,
//! files, glob patterns and serialised text, and deep-merges them into one
//! tree. Text is detected automatically: YAML (with `!const Type::NAME`
//! references), JSON, INI and the crate's own binary framing are tried in
//! that order. Lookups take `/`-separated paths and fall back to the nearest
//! ancestor's entry for the final segment. A protected set keeps selected
//! keys from being overwritten by later merges.
//!
//! ```
//! use confstore::ConfigStore;
//! use serde_json::json;
//!
//! let mut store = ConfigStore::new();
//! store.set_protected(json!({"db": {"host": true}}));
//! let report = store.integrate([
//!     json!({"db": {"host": "primary"}}),
//!     json!({"db": {"host": "replica", "pool": 8}}),
//! ]);
//! assert!(report.is_clean());
//! assert_eq!(store.export(), json!({"db": {"pool": 8}}));
//! ```
//!
//! Protection applies to incoming fragments only, so keys already present
//! when the protected set is installed stay put while later writes to them
//! are dropped.

use std::sync::Arc;

pub mod constants;
mod error;
pub mod global;
pub mod mask;
pub mod merge;
pub mod parser;
pub mod path;
mod result_ext;
pub mod source;
mod store;
pub mod tree;

pub use constants::{ConstantRegistry, ConstantResolver};
pub use error::{AggregatedErrors, RegistryError};
pub use global::{global, overrides};
pub use parser::{ContentParser, DecodeError, DecodeFailure, Decoder, Format};
pub use result_ext::RegistryResultExt;
pub use source::Source;
pub use store::{ConfigStore, ConfigStoreBuilder, IntegrationReport, Iter};
pub use tree::{ConfigMap, ConfigTree};

/// Result type used throughout the crate.
pub type RegistryResult<T> = Result<T, Arc<RegistryError>>;
