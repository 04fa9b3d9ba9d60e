//! Self-describing content detection.
//!
//! Raw configuration text (or bytes) is offered to an ordered chain of
//! [`Decoder`]s. The first decoder that turns the input into a non-empty map
//! or sequence wins; decoders are never combined. A decoder that merely
//! echoes its input back as a string is treated as having failed, so a plain
//! word never masquerades as a YAML document.

mod binary;
mod ini;
mod json;
mod yaml;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::constants::{ConstantRegistry, ConstantResolver};
use crate::tree::{ConfigTree, is_populated_structure};

pub use binary::{BinaryDecoder, decode_binary, encode_binary};
pub use ini::{IniDecoder, render_ini};
pub use json::JsonDecoder;
pub use yaml::{CONST_TAG, YamlDecoder};

/// Serialisation formats understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// YAML, including the `!const` tag.
    Yaml,
    /// JSON.
    Json,
    /// INI with typed scalars.
    Ini,
    /// The registry's own `bincode` framing.
    Binary,
}

impl Format {
    /// Lower-case name of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Ini => "ini",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a single decoder rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A text decoder was handed bytes that are not UTF-8.
    #[error("input is not valid UTF-8")]
    NotUtf8,
    /// The codec itself rejected the input.
    #[error("{message}")]
    Syntax {
        /// Codec-specific description.
        message: String,
    },
    /// The decoder returned the input text unchanged.
    #[error("decoder echoed its input")]
    Echo,
    /// The decoder produced a scalar, `null` or an empty structure.
    #[error("decoded value is not a non-empty map or sequence")]
    Unstructured,
    /// A `!const` reference was not of the form `Type::NAME`.
    #[error("malformed constant reference '{reference}'")]
    MalformedConstant {
        /// Reference text as written in the document.
        reference: String,
    },
    /// A `!const` reference named a constant nobody registered.
    #[error("unknown constant '{reference}'")]
    UnknownConstant {
        /// Reference text as written in the document.
        reference: String,
    },
}

impl DecodeError {
    /// Wrap a codec error message.
    pub fn syntax(message: impl fmt::Display) -> Self {
        Self::Syntax {
            message: message.to_string(),
        }
    }
}

/// One decoder's rejection, tagged with its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Format of the decoder that failed.
    pub format: Format,
    /// Why it failed.
    pub error: DecodeError,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.format, self.error)
    }
}

/// Render a list of decoder failures on one line.
#[must_use]
pub fn render_failures(failures: &[DecodeFailure]) -> String {
    if failures.is_empty() {
        return "no decoders configured".to_owned();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single format decoder in the parsing chain.
pub trait Decoder: Send + Sync {
    /// Format handled by this decoder.
    fn format(&self) -> Format;

    /// Decode `input` into a tree.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the input is not in this format.
    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError>;
}

/// Successful outcome of [`ContentParser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The decoded tree.
    pub tree: ConfigTree,
    /// Format of the decoder that accepted the input.
    pub format: Format,
}

/// Ordered chain of decoders; first acceptable result wins.
pub struct ContentParser {
    decoders: Vec<Box<dyn Decoder>>,
}

impl ContentParser {
    /// Parser with the standard chain and no registered constants.
    #[must_use]
    pub fn new() -> Self {
        Self::with_constants(Arc::new(ConstantRegistry::new()))
    }

    /// Parser with the standard chain (YAML, JSON, INI, binary) whose YAML
    /// decoder resolves `!const` references through `resolver`.
    #[must_use]
    pub fn with_constants(resolver: Arc<dyn ConstantResolver>) -> Self {
        Self::from_decoders(vec![
            Box::new(YamlDecoder::new(resolver)),
            Box::new(JsonDecoder),
            Box::new(IniDecoder),
            Box::new(BinaryDecoder),
        ])
    }

    /// Parser with a caller-supplied chain, tried in order.
    #[must_use]
    pub fn from_decoders(decoders: Vec<Box<dyn Decoder>>) -> Self {
        Self { decoders }
    }

    /// Formats in the order they are attempted.
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.decoders.iter().map(|decoder| decoder.format())
    }

    /// Offer `input` to each decoder in turn.
    ///
    /// # Errors
    ///
    /// Returns one [`DecodeFailure`] per decoder when none of them produced
    /// an acceptable tree.
    pub fn parse(&self, input: &[u8]) -> Result<Parsed, Vec<DecodeFailure>> {
        let mut failures = Vec::with_capacity(self.decoders.len());
        for decoder in &self.decoders {
            let format = decoder.format();
            match decoder.decode(input).and_then(|tree| accept(input, tree)) {
                Ok(tree) => return Ok(Parsed { tree, format }),
                Err(error) => failures.push(DecodeFailure { format, error }),
            }
        }
        Err(failures)
    }
}

impl Default for ContentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContentParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentParser")
            .field("formats", &self.formats().collect::<Vec<_>>())
            .finish()
    }
}

fn accept(input: &[u8], tree: ConfigTree) -> Result<ConfigTree, DecodeError> {
    if is_echo(input, &tree) {
        return Err(DecodeError::Echo);
    }
    if !is_populated_structure(&tree) {
        return Err(DecodeError::Unstructured);
    }
    Ok(tree)
}

fn is_echo(input: &[u8], tree: &ConfigTree) -> bool {
    let Value::String(decoded) = tree else {
        return false;
    };
    std::str::from_utf8(input).is_ok_and(|text| text.trim() == decoded.trim())
}

/// Borrow `input` as text, dropping a leading byte-order mark.
pub(crate) fn as_text(input: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(input)
        .map(|text| text.trim_start_matches('\u{feff}'))
        .map_err(|_| DecodeError::NotUtf8)
}

#[cfg(test)]
mod tests;
