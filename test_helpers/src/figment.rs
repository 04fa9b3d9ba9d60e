//! Running tests inside a `figment::Jail`.
//!
//! The jail gives each test a fresh temporary working directory and holds a
//! process-wide lock while it runs, so relative source paths and glob
//! patterns cannot leak between tests.

use anyhow::{Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

use crate::files::write_files;

/// Executes `f` inside a [`figment::Jail`] after writing `files` into the
/// jail directory, returning the closure's output.
///
/// The closure receives the jail directory. The working directory is restored
/// once the closure completes, even when it returns an error.
///
/// # Errors
///
/// Returns an error if the jail cannot be set up, a fixture file cannot be
/// written, or the closure fails.
pub fn with_jail<F, T>(files: &[(&str, &str)], f: F) -> Result<T>
where
    F: FnOnce(&Utf8Path) -> Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        let root = Utf8PathBuf::from_path_buf(jail.directory().to_path_buf())
            .map_err(|path| figment_error(format!("non UTF-8 jail at {}", path.display())))?;
        write_files(&root, files).map_err(figment_error)?;
        output = Some(f(&root).map_err(figment_error)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any error implementing [`ToString`] into a [`figment::Error`].
#[expect(
    clippy::needless_pass_by_value,
    reason = "used as a map_err adaptor over owned errors"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
