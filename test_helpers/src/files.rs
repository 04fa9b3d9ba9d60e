//! Writing configuration fixtures to disk.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Writes each `(relative path, contents)` pair below `root`, creating
/// parent directories as needed, and returns the written paths in order.
///
/// # Errors
///
/// Returns an error when a directory or file cannot be created.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use test_helpers::files::write_files;
///
/// let dir = tempfile::tempdir()?;
/// let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow::anyhow!("non UTF-8"))?;
/// let written = write_files(root, &[("conf.d/app.yaml", "port: 80\n")])?;
/// assert!(written.iter().all(|path| path.is_file()));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn write_files(root: &Utf8Path, files: &[(&str, &str)]) -> Result<Vec<Utf8PathBuf>> {
    files
        .iter()
        .map(|(relative, contents)| {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create directory {parent}"))?;
            }
            std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
            Ok(path)
        })
        .collect()
}
