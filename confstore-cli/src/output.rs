//! Output writers for `confstore`.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use confstore::ConfigTree;

use crate::cli::ValueFormat;
use crate::error::CliError;

/// Renders a single value. JSON output ends with a newline like YAML does.
pub fn render_value(value: &ConfigTree, format: ValueFormat) -> Result<String, CliError> {
    Ok(match format {
        ValueFormat::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            text
        }
        ValueFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Writes `payload` to standard output or the given writer.
pub fn emit(out: &mut impl Write, payload: &[u8]) -> Result<(), CliError> {
    out.write_all(payload)
        .and_then(|()| out.flush())
        .map_err(CliError::Stdout)
}

/// Writes `payload` to `path`, creating parent directories as needed.
pub fn write_file(path: &Utf8Path, payload: &[u8]) -> Result<Utf8PathBuf, CliError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidOutput(path.to_path_buf()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = ensure_dir(parent)?;
    dir.write(file_name, payload).map_err(|io_err| CliError::Io {
        path: path.to_path_buf(),
        source: io_err,
    })?;
    Ok(path.to_path_buf())
}

fn ensure_dir(path: &Utf8Path) -> Result<Dir, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == std::io::ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority()).map_err(io_error)?;
            Dir::open_ambient_dir(path, ambient_authority()).map_err(io_error)
        }
        Err(open_err) => Err(io_error(open_err)),
    }
}
