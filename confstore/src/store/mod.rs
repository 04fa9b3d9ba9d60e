//! The configuration store.
//!
//! [`ConfigStore`] owns one merged [`ConfigTree`] and an optional protected
//! set. Sources are ingested through [`ConfigStore::integrate`]; each one is
//! classified, parsed, masked and merged in turn. Failures never abort a
//! batch: they are logged and returned in an [`IntegrationReport`].

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::constants::ConstantResolver;
use crate::mask::mask;
use crate::merge::merge_into;
use crate::parser::{ContentParser, Decoder, Format, encode_binary, render_ini};
use crate::path::resolve;
use crate::source::{self, Fragment, Source};
use crate::tree::{ConfigTree, empty_tree, is_empty_tree};
use crate::{RegistryError, RegistryResult, RegistryResultExt};

/// A hierarchical configuration registry.
///
/// # Examples
///
/// ```
/// use confstore::ConfigStore;
/// use serde_json::json;
///
/// let mut store = ConfigStore::new();
/// let report = store.integrate([json!({"log": {"timeZone": "Europe/Berlin"}})]);
/// assert!(report.is_clean());
/// assert!(store.integrate(["console:\n  level: INFO\n"]).is_clean());
///
/// assert_eq!(store.get("console/level"), Some(&json!("INFO")));
/// assert_eq!(store.get("console/timeZone"), Some(&json!("Europe/Berlin")));
/// assert_eq!(store.get("missing/path"), None);
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    tree: ConfigTree,
    protected: Option<ConfigTree>,
    parser: ContentParser,
    strict: bool,
}

impl ConfigStore {
    /// An empty store with the standard decoder chain and no constants.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a store.
    #[must_use]
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::default()
    }

    /// Switch all-or-nothing ingestion on or off.
    ///
    /// A strict store leaves its tree untouched when any source of a batch
    /// fails.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether batches are applied all-or-nothing.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// The decoder chain used for text, bytes and files.
    #[must_use]
    pub const fn parser(&self) -> &ContentParser {
        &self.parser
    }

    /// Ingest `sources` in order.
    ///
    /// Each source is resolved into zero or more trees which are masked by
    /// the protected set and merged into the store. Sources that cannot be
    /// read or parsed are skipped and listed in the returned report.
    pub fn integrate<I, S>(&mut self, sources: I) -> IntegrationReport
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let mut fragments = Vec::new();
        let mut failures = Vec::new();
        for item in sources {
            for outcome in source::collect(item.into(), &self.parser) {
                match outcome {
                    Ok(fragment) => fragments.push(fragment),
                    Err(err) => {
                        warn!(error = %err, "skipping configuration source");
                        failures.push(err);
                    }
                }
            }
        }

        if self.strict && !failures.is_empty() {
            warn!(
                failed = failures.len(),
                discarded = fragments.len(),
                "strict store left unchanged"
            );
            return IntegrationReport {
                merged: Vec::new(),
                failures,
                applied: false,
            };
        }

        let merged = fragments
            .into_iter()
            .map(|fragment| self.apply(fragment))
            .collect();
        IntegrationReport {
            merged,
            failures,
            applied: true,
        }
    }

    /// Alias of [`ConfigStore::integrate`] for runtime overrides.
    pub fn set<I, S>(&mut self, sources: I) -> IntegrationReport
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        self.integrate(sources)
    }

    fn apply(&mut self, fragment: Fragment) -> String {
        let Fragment {
            origin,
            tree,
            format,
        } = fragment;
        match format {
            Some(detected) => debug!(%origin, format = %detected, "merging configuration"),
            None => debug!(%origin, "merging configuration"),
        }
        let incoming = match &self.protected {
            Some(protected) => mask(protected, tree),
            None => tree,
        };
        merge_into(&mut self.tree, incoming);
        origin
    }

    /// Drop all configuration. The protected set is kept.
    pub fn clear(&mut self) {
        self.tree = empty_tree();
    }

    /// Install `protected` as the protected set, replacing any previous one.
    /// An empty tree removes protection.
    pub fn set_protected(&mut self, protected: ConfigTree) {
        self.protected = (!is_empty_tree(&protected)).then_some(protected);
    }

    /// Remove the protected set.
    pub fn clear_protected(&mut self) {
        self.protected = None;
    }

    /// The installed protected set, if any.
    #[must_use]
    pub const fn protected(&self) -> Option<&ConfigTree> {
        self.protected.as_ref()
    }

    /// Look up a `/`-separated path, falling back to the nearest ancestor's
    /// entry for the final segment.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ConfigTree> {
        resolve(&self.tree, path)
    }

    /// Look up `path` and deserialize the value into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Serialize`] when the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> RegistryResult<Option<T>> {
        self.get(path)
            .map(|value| T::deserialize(value).into_registry())
            .transpose()
    }

    /// An owned snapshot of the whole tree.
    #[must_use]
    pub fn export(&self) -> ConfigTree {
        self.tree.clone()
    }

    /// Serialise the whole tree in `format`.
    ///
    /// The output is accepted by [`Source::Bytes`] on another store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Serialize`] or [`RegistryError::Encode`] when
    /// the codec rejects the tree.
    pub fn export_as(&self, format: Format) -> RegistryResult<Vec<u8>> {
        match format {
            Format::Yaml => serde_yaml::to_string(&self.tree)
                .map(String::into_bytes)
                .into_registry(),
            Format::Json => serde_json::to_vec_pretty(&self.tree).into_registry(),
            Format::Ini => render_ini(&self.tree)
                .map(String::into_bytes)
                .map_err(RegistryError::serialize),
            Format::Binary => encode_binary(&self.tree),
        }
    }

    /// Whether the store holds no configuration.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_empty_tree(&self.tree)
    }

    /// Number of top-level entries: map keys, or items of a sequence root.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.tree {
            ConfigTree::Object(map) => map.len(),
            ConfigTree::Array(items) => items.len(),
            _ => 0,
        }
    }

    /// Whether the root map holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.tree
            .as_object()
            .is_some_and(|map| map.contains_key(key))
    }

    /// The top-level value at `key`, without fallback.
    #[must_use]
    pub fn top_level(&self, key: &str) -> Option<&ConfigTree> {
        self.tree.as_object()?.get(key)
    }

    /// Top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Top-level entries in insertion order. A sequence root has no keyed
    /// entries and yields nothing.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.tree.as_object().map(serde_json::Map::iter),
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for ConfigStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tree.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a ConfigStore {
    type Item = (&'a str, &'a ConfigTree);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the top-level entries of a [`ConfigStore`].
pub struct Iter<'a> {
    inner: Option<serde_json::map::Iter<'a>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a ConfigTree);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .as_mut()?
            .next()
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// Outcome of one [`ConfigStore::integrate`] call.
#[derive(Debug, Clone)]
#[must_use]
pub struct IntegrationReport {
    merged: Vec<String>,
    failures: Vec<Arc<RegistryError>>,
    applied: bool,
}

impl IntegrationReport {
    /// Origins of the trees merged into the store, in merge order.
    #[must_use]
    pub fn merged(&self) -> &[String] {
        &self.merged
    }

    /// Sources that were skipped.
    #[must_use]
    pub fn failures(&self) -> &[Arc<RegistryError>] {
        &self.failures
    }

    /// `false` when a strict store discarded the batch.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Whether every source was ingested.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// View the report strictly.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or [`RegistryError::Aggregate`] holding
    /// all of them, when any source was skipped.
    pub fn into_result(self) -> RegistryResult<Vec<String>> {
        match RegistryError::try_aggregate(self.failures) {
            Some(err) => Err(Arc::new(err)),
            None => Ok(self.merged),
        }
    }
}

impl fmt::Display for IntegrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} merged, {} skipped",
            self.merged.len(),
            self.failures.len()
        )?;
        if !self.applied {
            f.write_str(" (batch discarded)")?;
        }
        Ok(())
    }
}

/// Builder for [`ConfigStore`].
///
/// ```
/// use confstore::{ConfigStore, ConstantRegistry};
/// use serde_json::json;
///
/// let constants = ConstantRegistry::new().with("Level", "DEBUG", json!("debug"));
/// let mut store = ConfigStore::builder()
///     .constants(constants)
///     .protected(json!({"log": {"level": true}}))
///     .build();
/// let report = store.integrate(["log:\n  level: !const Level::DEBUG\n  file: app.log\n"]);
/// assert!(report.is_clean());
/// assert_eq!(store.get("log/level"), None);
/// assert_eq!(store.get("log/file"), Some(&json!("app.log")));
/// ```
#[derive(Default)]
#[must_use]
pub struct ConfigStoreBuilder {
    constants: Option<Arc<dyn ConstantResolver>>,
    decoders: Option<Vec<Box<dyn Decoder>>>,
    protected: Option<ConfigTree>,
    strict: bool,
}

impl ConfigStoreBuilder {
    /// Resolve `!const` references through `resolver`.
    pub fn constants(mut self, resolver: impl ConstantResolver + 'static) -> Self {
        self.constants = Some(Arc::new(resolver));
        self
    }

    /// Replace the decoder chain. Takes precedence over
    /// [`ConfigStoreBuilder::constants`].
    pub fn decoders(mut self, decoders: Vec<Box<dyn Decoder>>) -> Self {
        self.decoders = Some(decoders);
        self
    }

    /// Install an initial protected set.
    pub fn protected(mut self, protected: ConfigTree) -> Self {
        self.protected = Some(protected);
        self
    }

    /// Apply batches all-or-nothing.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Finish the store.
    #[must_use]
    pub fn build(self) -> ConfigStore {
        let parser = match (self.decoders, self.constants) {
            (Some(decoders), _) => ContentParser::from_decoders(decoders),
            (None, Some(resolver)) => ContentParser::with_constants(resolver),
            (None, None) => ContentParser::new(),
        };
        let mut store = ConfigStore {
            tree: empty_tree(),
            protected: None,
            parser,
            strict: self.strict,
        };
        if let Some(protected) = self.protected {
            store.set_protected(protected);
        }
        store
    }
}

impl fmt::Debug for ConfigStoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStoreBuilder")
            .field("constants", &self.constants.is_some())
            .field("decoders", &self.decoders.as_ref().map(Vec::len))
            .field("protected", &self.protected)
            .field("strict", &self.strict)
            .finish()
    }
}
