//! Binary framing for whole trees, backed by `bincode`.
//!
//! `serde_json::Value` cannot travel through `bincode` directly (it needs a
//! self-describing format), so trees are mirrored into [`WireTree`] first.
//! Every payload starts with [`MAGIC`] so arbitrary text is rejected before
//! `bincode` sees it. Decoding goes through [`TreeSeed`], which builds the
//! tree directly and refuses containers nested more than 128 levels deep.

use std::fmt;

use bincode::Options;
use serde::Serialize;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, SeqAccess, Unexpected, VariantAccess,
    Visitor,
};
use serde_json::{Map, Number, Value};

use super::{DecodeError, Decoder, Format};
use crate::tree::ConfigTree;
use crate::{RegistryResult, RegistryResultExt};

/// Header prepended to every encoded tree.
pub const MAGIC: &[u8] = b"CFST\x01";

/// Deepest container nesting accepted when decoding, matching `serde_json`.
const MAX_DEPTH: usize = 128;

const SIZE_LIMIT: u64 = 64 * 1024 * 1024;

const VARIANTS: &[&str] = &[
    "Null", "Bool", "Integer", "Unsigned", "Float", "Text", "Sequence", "Map",
];

/// Encoding mirror of a tree; variant order fixes the wire tags.
#[derive(Debug, Serialize)]
enum WireTree {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Sequence(Vec<WireTree>),
    Map(Vec<(String, WireTree)>),
}

impl From<&ConfigTree> for WireTree {
    fn from(tree: &ConfigTree) -> Self {
        match tree {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => wire_number(number),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

fn wire_number(number: &Number) -> WireTree {
    if let Some(int) = number.as_i64() {
        WireTree::Integer(int)
    } else if let Some(unsigned) = number.as_u64() {
        WireTree::Unsigned(unsigned)
    } else {
        number.as_f64().map_or(WireTree::Null, WireTree::Float)
    }
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(SIZE_LIMIT)
        .reject_trailing_bytes()
}

/// Encode `tree` in the registry's binary format.
///
/// # Errors
///
/// Returns [`crate::RegistryError::Encode`] when `bincode` fails, for
/// example when the tree exceeds the size limit.
///
/// # Examples
///
/// ```
/// use confstore::parser::{decode_binary, encode_binary};
/// use serde_json::json;
///
/// let tree = json!({"server": {"port": 8080, "tags": ["a", "b"]}});
/// let bytes = encode_binary(&tree)?;
/// assert_eq!(decode_binary(&bytes).ok(), Some(tree));
/// # Ok::<_, std::sync::Arc<confstore::RegistryError>>(())
/// ```
pub fn encode_binary(tree: &ConfigTree) -> RegistryResult<Vec<u8>> {
    let payload = options().serialize(&WireTree::from(tree)).into_registry()?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode bytes produced by [`encode_binary`].
///
/// # Errors
///
/// Returns [`DecodeError::Syntax`] when the header is missing, the payload is
/// malformed or has trailing bytes, or containers nest more than 128 levels
/// deep.
pub fn decode_binary(bytes: &[u8]) -> Result<ConfigTree, DecodeError> {
    let payload = bytes
        .strip_prefix(MAGIC)
        .ok_or_else(|| DecodeError::syntax("missing binary header"))?;
    options()
        .deserialize_seed(TreeSeed { depth: 0 }, payload)
        .map_err(DecodeError::syntax)
}

/// Reads one [`WireTree`] node straight into a [`ConfigTree`].
#[derive(Clone, Copy)]
struct TreeSeed {
    depth: usize,
}

impl TreeSeed {
    fn nested<E: de::Error>(self) -> Result<Self, E> {
        if self.depth >= MAX_DEPTH {
            return Err(E::custom(format_args!(
                "binary tree nests deeper than {MAX_DEPTH} levels"
            )));
        }
        Ok(Self {
            depth: self.depth + 1,
        })
    }
}

impl<'de> DeserializeSeed<'de> for TreeSeed {
    type Value = ConfigTree;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_enum("WireTree", VARIANTS, self)
    }
}

impl<'de> Visitor<'de> for TreeSeed {
    type Value = ConfigTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a binary configuration tree")
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Self::Value, A::Error> {
        let (tag, variant) = data.variant::<u32>()?;
        match tag {
            0 => variant.unit_variant().map(|()| Value::Null),
            1 => variant.newtype_variant().map(Value::Bool),
            2 => variant
                .newtype_variant::<i64>()
                .map(|int| Value::Number(int.into())),
            3 => variant
                .newtype_variant::<u64>()
                .map(|unsigned| Value::Number(unsigned.into())),
            4 => variant
                .newtype_variant::<f64>()
                .map(|float| Number::from_f64(float).map_or(Value::Null, Value::Number)),
            5 => variant.newtype_variant().map(Value::String),
            6 => variant.newtype_variant_seed(SequenceSeed(self.nested::<A::Error>()?)),
            7 => variant.newtype_variant_seed(MapSeed(self.nested::<A::Error>()?)),
            other => Err(de::Error::invalid_value(
                Unexpected::Unsigned(other.into()),
                &"a tree tag below 8",
            )),
        }
    }
}

/// Elements of a `Sequence`, each read one level deeper.
struct SequenceSeed(TreeSeed);

impl<'de> DeserializeSeed<'de> for SequenceSeed {
    type Value = ConfigTree;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for SequenceSeed {
    type Value = ConfigTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of trees")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.0)? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }
}

/// `(key, tree)` entries of a `Map`, values read one level deeper.
struct MapSeed(TreeSeed);

impl<'de> DeserializeSeed<'de> for MapSeed {
    type Value = ConfigTree;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for MapSeed {
    type Value = ConfigTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of map entries")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = seq.next_element_seed(EntrySeed(self.0))? {
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

struct EntrySeed(TreeSeed);

impl<'de> DeserializeSeed<'de> for EntrySeed {
    type Value = (String, ConfigTree);

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_tuple(2, self)
    }
}

impl<'de> Visitor<'de> for EntrySeed {
    type Value = (String, ConfigTree);

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a key and its tree")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let key: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let value = seq
            .next_element_seed(self.0)?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        Ok((key, value))
    }
}

/// Decoder for the binary format; the parser's last resort.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryDecoder;

impl Decoder for BinaryDecoder {
    fn format(&self) -> Format {
        Format::Binary
    }

    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError> {
        decode_binary(input)
    }
}

#[cfg(test)]
mod tests {
    use super::{MAGIC, MAX_DEPTH, decode_binary, encode_binary};
    use crate::parser::{ContentParser, DecodeError, Format};
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;
    use serde_json::{Value, json};

    /// `depth` one-element sequences wrapped around a null, in wire form.
    fn nested_sequences(depth: usize) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        for _ in 0..depth {
            bytes.extend_from_slice(&6_u32.to_le_bytes());
            bytes.extend_from_slice(&1_u64.to_le_bytes());
        }
        bytes.extend_from_slice(&0_u32.to_le_bytes());
        bytes
    }

    #[test]
    fn keeps_numbers_and_key_order() -> Result<()> {
        let tree = json!({
            "z": -1,
            "a": 18_446_744_073_709_551_615_u64,
            "m": 2.5,
            "nested": {"flag": true, "none": null, "list": ["x", 1]}
        });
        let bytes = encode_binary(&tree).map_err(|err| anyhow!(err.to_string()))?;
        ensure!(bytes.starts_with(MAGIC), "header missing");
        let decoded = decode_binary(&bytes).map_err(|err| anyhow!(err.to_string()))?;
        ensure!(decoded == tree, "decoded tree differs: {decoded}");
        let keys: Vec<&String> = decoded
            .as_object()
            .map(|map| map.keys().collect())
            .unwrap_or_default();
        ensure!(keys == ["z", "a", "m", "nested"], "key order lost: {keys:?}");
        Ok(())
    }

    #[test]
    fn rejects_headerless_and_truncated_input() {
        assert!(matches!(decode_binary(b"plain text"), Err(DecodeError::Syntax { .. })));
        let mut truncated = MAGIC.to_vec();
        truncated.extend_from_slice(&[7, 0, 0]);
        assert!(matches!(decode_binary(&truncated), Err(DecodeError::Syntax { .. })));
    }

    #[test]
    fn parser_falls_through_to_binary() -> Result<()> {
        let tree = json!({"service": {"name": "a=b", "retries": 3}});
        let bytes = encode_binary(&tree).map_err(|err| anyhow!(err.to_string()))?;
        let parsed = ContentParser::new()
            .parse(&bytes)
            .map_err(|failures| anyhow!("{failures:?}"))?;
        ensure!(parsed.format == Format::Binary, "accepted by {}", parsed.format);
        ensure!(parsed.tree == tree, "unexpected tree {}", parsed.tree);
        Ok(())
    }

    #[test]
    fn accepts_nesting_up_to_the_limit() -> Result<()> {
        let decoded =
            decode_binary(&nested_sequences(MAX_DEPTH)).map_err(|err| anyhow!(err.to_string()))?;
        let mut expected = Value::Null;
        for _ in 0..MAX_DEPTH {
            expected = Value::Array(vec![expected]);
        }
        ensure!(decoded == expected, "nested tree changed shape");
        Ok(())
    }

    #[rstest]
    #[case::one_past_the_limit(MAX_DEPTH + 1)]
    #[case::far_past_the_limit(100_000)]
    fn rejects_deeper_nesting(#[case] depth: usize) {
        let outcome = decode_binary(&nested_sequences(depth));
        assert!(
            matches!(&outcome, Err(DecodeError::Syntax { message }) if message.contains("deeper")),
            "unexpected {outcome:?}"
        );
    }

    #[test]
    fn deep_payloads_fail_to_parse_instead_of_aborting() {
        let outcome = ContentParser::new().parse(&nested_sequences(100_000));
        assert!(outcome.is_err(), "deep payload should be rejected");
    }
}
