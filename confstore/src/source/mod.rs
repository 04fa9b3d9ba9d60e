//! Configuration sources and their classification.
//!
//! A [`Source`] is anything the store can ingest. Callers that know what
//! they hold use the explicit variants; a bare string converts into
//! [`Source::Auto`] and is classified the way a shell user would expect: an
//! existing file, else a glob with at least one match, else in-memory text.

pub mod glob;

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::parser::{ContentParser, Format};
use crate::tree::ConfigTree;
use crate::{RegistryError, RegistryResult};

/// One input to [`crate::ConfigStore::integrate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// An in-memory tree merged as is.
    Tree(ConfigTree),
    /// A file read from disk and parsed.
    File(Utf8PathBuf),
    /// A glob pattern; every matching file is read and parsed.
    Glob(String),
    /// Configuration text parsed in memory.
    Text(String),
    /// Raw bytes parsed in memory, for example a binary export.
    Bytes(Vec<u8>),
    /// A string classified at ingestion time as file, glob or text.
    Auto(String),
}

impl Source {
    /// An in-memory tree.
    #[must_use]
    pub const fn tree(tree: ConfigTree) -> Self {
        Self::Tree(tree)
    }

    /// A file on disk.
    #[must_use]
    pub fn file(path: impl Into<Utf8PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// A glob pattern.
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Configuration text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Raw bytes.
    #[must_use]
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(_) => f.write_str("in-memory tree"),
            Self::File(path) => write!(f, "file '{path}'"),
            Self::Glob(pattern) => write!(f, "glob '{pattern}'"),
            Self::Text(_) => f.write_str("inline text"),
            Self::Bytes(bytes) => write!(f, "{} inline bytes", bytes.len()),
            Self::Auto(raw) if raw.contains('\n') => f.write_str("inline text"),
            Self::Auto(raw) => write!(f, "'{raw}'"),
        }
    }
}

impl From<ConfigTree> for Source {
    fn from(tree: ConfigTree) -> Self {
        Self::Tree(tree)
    }
}

impl From<&str> for Source {
    fn from(raw: &str) -> Self {
        Self::Auto(raw.to_owned())
    }
}

impl From<String> for Source {
    fn from(raw: String) -> Self {
        Self::Auto(raw)
    }
}

impl From<&Utf8Path> for Source {
    fn from(path: &Utf8Path) -> Self {
        Self::File(path.to_owned())
    }
}

impl From<Utf8PathBuf> for Source {
    fn from(path: Utf8PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A parsed tree ready to be masked and merged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub origin: String,
    pub tree: ConfigTree,
    pub format: Option<Format>,
}

/// Resolve `source` into zero or more fragments, one outcome per file or
/// in-memory document.
pub(crate) fn collect(source: Source, parser: &ContentParser) -> Vec<RegistryResult<Fragment>> {
    let origin = source.to_string();
    match source {
        Source::Tree(tree) => vec![from_tree(origin, tree)],
        Source::File(path) => vec![read_and_parse(&path, parser)],
        Source::Glob(pattern) => match glob::expand(&pattern) {
            Ok(paths) => {
                if paths.is_empty() {
                    tracing::debug!(%pattern, "glob matched no files");
                }
                paths.iter().map(|path| read_and_parse(path, parser)).collect()
            }
            Err(err) => vec![Err(err)],
        },
        Source::Text(text) => vec![parse_in_memory(origin, text.as_bytes(), parser)],
        Source::Bytes(bytes) => vec![parse_in_memory(origin, &bytes, parser)],
        Source::Auto(raw) => classify(origin, &raw, parser),
    }
}

fn classify(origin: String, raw: &str, parser: &ContentParser) -> Vec<RegistryResult<Fragment>> {
    let path = Utf8Path::new(raw);
    if !raw.contains('\n') && path.is_file() {
        return vec![read_and_parse(path, parser)];
    }
    let pattern_like = glob::looks_like_pattern(raw);
    if pattern_like
        && raw.trim_start().starts_with(['{', '['])
        && let Ok(fragment) = parse_in_memory(origin.clone(), raw.as_bytes(), parser)
    {
        return vec![Ok(fragment)];
    }
    if pattern_like
        && let Ok(paths) = glob::expand(raw)
        && !paths.is_empty()
    {
        return paths.iter().map(|file| read_and_parse(file, parser)).collect();
    }
    match parse_in_memory(origin, raw.as_bytes(), parser) {
        Err(err) if pattern_like && err.is_parse_failure() => {
            tracing::debug!(pattern = %raw, "pattern matched no files");
            Vec::new()
        }
        outcome => vec![outcome],
    }
}

fn from_tree(origin: String, tree: ConfigTree) -> RegistryResult<Fragment> {
    if !(tree.is_object() || tree.is_array()) {
        return Err(RegistryError::not_structured(origin));
    }
    Ok(Fragment {
        origin,
        tree,
        format: None,
    })
}

fn read_and_parse(path: &Utf8Path, parser: &ContentParser) -> RegistryResult<Fragment> {
    let bytes =
        std::fs::read(path).map_err(|err| RegistryError::unreadable(path.as_std_path(), err))?;
    parse_in_memory(format!("file '{path}'"), &bytes, parser)
}

fn parse_in_memory(
    origin: String,
    input: &[u8],
    parser: &ContentParser,
) -> RegistryResult<Fragment> {
    match parser.parse(input) {
        Ok(parsed) => Ok(Fragment {
            origin,
            tree: parsed.tree,
            format: Some(parsed.format),
        }),
        Err(failures) => Err(RegistryError::parse_failed(origin, failures)),
    }
}

#[cfg(test)]
mod tests {
    use super::{Fragment, Source, collect};
    use crate::{RegistryError, RegistryResult};
    use crate::parser::{ContentParser, Format};
    use anyhow::{Result, anyhow, ensure};
    use camino::Utf8Path;
    use rstest::rstest;
    use serde_json::json;
    use std::fs;

    fn fragments(source: Source) -> Vec<Result<Fragment, String>> {
        collect(source, &ContentParser::new())
            .into_iter()
            .map(|outcome| outcome.map_err(|err| err.to_string()))
            .collect()
    }

    fn first_error(outcome: &[RegistryResult<Fragment>]) -> Option<&RegistryError> {
        outcome.first().and_then(|result| result.as_ref().err()).map(|err| &**err)
    }

    #[rstest]
    #[case::auto_text(Source::from("a: 1\nb: 2"), "inline text")]
    #[case::text(Source::text("a: 1"), "inline text")]
    #[case::auto_word(Source::from("config.yaml"), "'config.yaml'")]
    #[case::bytes(Source::bytes(vec![1, 2]), "2 inline bytes")]
    #[case::file(Source::file("conf/app.ini"), "file 'conf/app.ini'")]
    fn describes_sources(#[case] source: Source, #[case] expected: &str) {
        assert_eq!(source.to_string(), expected);
    }

    #[test]
    fn auto_prefers_existing_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non UTF-8 tempdir"))?;
        let file = root.join("app.json");
        fs::write(&file, r#"{"app": {"name": "demo"}}"#)?;
        let outcome = fragments(Source::from(file.as_str()));
        ensure!(outcome.len() == 1, "expected one fragment");
        let fragment = outcome.into_iter().next().ok_or_else(|| anyhow!("missing"))?;
        let fragment = fragment.map_err(|err| anyhow!(err))?;
        ensure!(fragment.tree == json!({"app": {"name": "demo"}}), "wrong tree");
        ensure!(fragment.format == Some(Format::Yaml), "JSON is valid YAML");
        ensure!(fragment.origin == format!("file '{file}'"), "wrong origin {}", fragment.origin);
        Ok(())
    }

    #[test]
    fn auto_expands_globs_with_matches() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non UTF-8 tempdir"))?;
        fs::write(root.join("10-base.ini"), "[a]\nx = 1\n")?;
        fs::write(root.join("20-extra.ini"), "[a]\ny = 2\n")?;
        let outcome = fragments(Source::from(root.join("*.ini").as_str()));
        let trees: Vec<_> = outcome.into_iter().filter_map(Result::ok).map(|f| f.tree).collect();
        ensure!(
            trees == [json!({"a": {"x": 1}}), json!({"a": {"y": 2}})],
            "unexpected trees {trees:?}"
        );
        Ok(())
    }

    #[test]
    fn auto_glob_without_matches_is_a_no_op() {
        assert!(fragments(Source::from("*.nomatch")).is_empty());
    }

    #[test]
    fn auto_pattern_like_text_still_parses() {
        let outcome = fragments(Source::from("[1, 2]"));
        assert_eq!(outcome.len(), 1);
        assert_eq!(
            outcome.into_iter().next().and_then(Result::ok).map(|f| f.tree),
            Some(json!([1, 2]))
        );
    }

    #[test]
    fn explicit_glob_without_matches_yields_nothing() {
        assert!(fragments(Source::glob("/nowhere/at/all/*.yaml")).is_empty());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let outcome = collect(Source::file("/nowhere/at/all.yaml"), &ContentParser::new());
        assert!(matches!(
            first_error(&outcome),
            Some(RegistryError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn unparseable_text_is_a_parse_failure() {
        let outcome = collect(Source::text("just words"), &ContentParser::new());
        assert!(outcome.iter().all(|o| o.as_ref().is_err_and(|e| e.is_parse_failure())));
        assert_eq!(outcome.len(), 1);
    }

    #[rstest]
    #[case::scalar(json!(5))]
    #[case::string(json!("text"))]
    fn scalar_trees_are_rejected(#[case] tree: serde_json::Value) {
        let outcome = collect(Source::tree(tree), &ContentParser::new());
        assert!(matches!(
            first_error(&outcome),
            Some(RegistryError::NotStructured { .. })
        ));
    }
}
