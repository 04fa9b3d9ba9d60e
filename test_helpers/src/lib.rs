//! Test helpers shared across crates in the confstore workspace.
//!
//! [`files`] lays out configuration trees on disk and [`figment`] runs code
//! inside a `figment::Jail` so relative paths and glob patterns resolve
//! against a private working directory.

pub mod figment;
pub mod files;
