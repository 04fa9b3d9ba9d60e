//! Subcommand implementations.
//!
//! Each command writes to a caller-supplied writer so it can be exercised
//! without touching the real standard output.

use std::io::Write;

use camino::Utf8Path;
use confstore::{ConfigStore, IntegrationReport};
use tracing::info;

use crate::cli::{ExportFormat, ValueFormat};
use crate::error::CliError;
use crate::output::{emit, render_value, write_file};

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command did what was asked.
    Success,
    /// `get` found no value at the path.
    NotFound,
    /// `check` found sources that could not be ingested.
    SourcesFailed,
}

/// Prints the value at `path`.
pub fn get(
    store: &ConfigStore,
    path: &str,
    format: ValueFormat,
    out: &mut impl Write,
) -> Result<Status, CliError> {
    let Some(value) = store.get(path) else {
        info!(%path, "no value found");
        return Ok(Status::NotFound);
    };
    emit(out, render_value(value, format)?.as_bytes())?;
    Ok(Status::Success)
}

/// Prints or writes the whole tree.
pub fn export(
    store: &ConfigStore,
    format: ExportFormat,
    target: Option<&Utf8Path>,
    out: &mut impl Write,
) -> Result<Status, CliError> {
    let payload = store.export_as(format.into())?;
    match target {
        Some(path) => {
            let written = write_file(path, &payload)?;
            info!(path = %written, bytes = payload.len(), "exported configuration");
        }
        None => emit(out, &payload)?,
    }
    Ok(Status::Success)
}

/// Lists skipped sources.
pub fn check(report: &IntegrationReport, out: &mut impl Write) -> Result<Status, CliError> {
    let mut text = String::new();
    for failure in report.failures() {
        text.push_str("skipped: ");
        text.push_str(&failure.to_string());
        text.push('\n');
    }
    text.push_str(&report.to_string());
    text.push('\n');
    emit(out, text.as_bytes())?;
    Ok(if report.is_clean() {
        Status::Success
    } else {
        Status::SourcesFailed
    })
}
