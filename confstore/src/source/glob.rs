//! Glob expansion over the local filesystem.
//!
//! Patterns are compiled with `globset` and matched against the files found
//! by walking the longest literal directory prefix of the pattern with
//! `walkdir`. Matches come back sorted so ingestion order is stable. As in
//! the shell, entries whose name starts with `.` are skipped unless the
//! pattern names a dot entry itself.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::{RegistryError, RegistryResult};

const META: [char; 4] = ['*', '?', '[', '{'];

/// Returns `true` when `candidate` is a single line containing glob
/// metacharacters.
#[must_use]
pub fn looks_like_pattern(candidate: &str) -> bool {
    !candidate.contains('\n') && candidate.contains(META)
}

/// Expand `pattern` into the sorted list of regular files it matches.
///
/// A pattern that matches nothing yields an empty list, as does a pattern
/// whose base directory does not exist.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidPattern`] when the pattern does not
/// compile.
pub fn expand(pattern: &str) -> RegistryResult<Vec<Utf8PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| {
            Arc::new(RegistryError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            })
        })?
        .compile_matcher();
    let (root, depth) = walk_root(pattern);
    let strip_dot = root == "." && !pattern.starts_with("./");
    let show_hidden = names_hidden(pattern);

    let mut walker = WalkDir::new(root.as_std_path())
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if let Some(max) = depth {
        walker = walker.max_depth(max);
    }

    let mut matches = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|entry| show_hidden || entry.depth() == 0 || !is_hidden(entry));
    for item in entries {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(%pattern, error = %err, "skipping unreadable glob entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 path");
            continue;
        };
        let candidate = if strip_dot {
            path.strip_prefix(".").unwrap_or(path)
        } else {
            path
        };
        if matcher.is_match(candidate.as_std_path()) {
            matches.push(candidate.to_owned());
        }
    }
    matches.sort();
    Ok(matches)
}

/// Returns `true` when a component below the walk root starts with `.` and
/// so asks for hidden entries.
fn names_hidden(pattern: &str) -> bool {
    let components: Vec<&str> = pattern.split('/').collect();
    components
        .iter()
        .skip(literal_prefix_len(&components))
        .any(|component| component.starts_with('.') && *component != "." && *component != "..")
}

/// Number of leading components that make up the directory to walk.
fn literal_prefix_len(components: &[&str]) -> usize {
    let literal = components
        .iter()
        .take_while(|component| !component.contains(META))
        .count();
    if literal == components.len() {
        literal.saturating_sub(1)
    } else {
        literal
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Split `pattern` into the directory to walk and the maximum walk depth.
///
/// The root is the longest run of leading components free of
/// metacharacters; `None` depth means the pattern contains `**`.
fn walk_root(pattern: &str) -> (Utf8PathBuf, Option<usize>) {
    let components: Vec<&str> = pattern.split('/').collect();
    let (base, rest) = components.split_at(literal_prefix_len(&components));
    let joined = base.join("/");
    let root = if joined.is_empty() {
        Utf8PathBuf::from(if pattern.starts_with('/') { "/" } else { "." })
    } else {
        Utf8PathBuf::from(joined)
    };
    let depth = (!rest.iter().any(|component| component.contains("**"))).then_some(rest.len());
    (root, depth)
}
