//! YAML decoding backed by `serde_yaml`, with `!const` resolution.

use std::sync::Arc;

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;
use serde_yaml::value::TaggedValue;

use super::{DecodeError, Decoder, Format, as_text};
use crate::constants::{ConstantResolver, split_reference};
use crate::tree::ConfigTree;

/// Tag (without the leading `!`) that marks a constant reference.
pub const CONST_TAG: &str = "const";

/// Decoder for YAML documents.
///
/// Scalars tagged `!const Type::NAME` are replaced by whatever the injected
/// resolver returns for `("Type", "NAME")`. Other tags are ignored and their
/// values kept as written.
pub struct YamlDecoder {
    resolver: Arc<dyn ConstantResolver>,
}

impl YamlDecoder {
    /// Decoder that resolves constants through `resolver`.
    #[must_use]
    pub fn new(resolver: Arc<dyn ConstantResolver>) -> Self {
        Self { resolver }
    }

    fn convert(&self, value: YamlValue) -> Result<ConfigTree, DecodeError> {
        Ok(match value {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(flag) => Value::Bool(flag),
            YamlValue::Number(number) => convert_number(&number),
            YamlValue::String(text) => Value::String(text),
            YamlValue::Sequence(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<_, _>>()?,
            ),
            YamlValue::Mapping(mapping) => {
                let mut map = Map::new();
                for (key, entry) in mapping {
                    map.insert(mapping_key(key)?, self.convert(entry)?);
                }
                Value::Object(map)
            }
            YamlValue::Tagged(tagged) => self.convert_tagged(*tagged)?,
        })
    }

    fn convert_tagged(&self, tagged: TaggedValue) -> Result<ConfigTree, DecodeError> {
        let tag = tagged.tag.to_string();
        if tag.trim_start_matches('!') != CONST_TAG {
            tracing::debug!(%tag, "ignoring unrecognised YAML tag");
            return self.convert(tagged.value);
        }
        let reference = match tagged.value {
            YamlValue::String(reference) => reference,
            other => {
                return Err(DecodeError::MalformedConstant {
                    reference: format!("{other:?}"),
                });
            }
        };
        let Some((owner, name)) = split_reference(&reference) else {
            return Err(DecodeError::MalformedConstant { reference });
        };
        self.resolver
            .resolve(owner, name)
            .ok_or(DecodeError::UnknownConstant { reference })
    }
}

impl Decoder for YamlDecoder {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError> {
        let text = as_text(input)?;
        let document: YamlValue = serde_yaml::from_str(text).map_err(DecodeError::syntax)?;
        self.convert(document)
    }
}

fn convert_number(number: &serde_yaml::Number) -> ConfigTree {
    if let Some(int) = number.as_i64() {
        return Value::Number(int.into());
    }
    if let Some(unsigned) = number.as_u64() {
        return Value::Number(unsigned.into());
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Map keys become strings; scalar keys are rendered, compound keys rejected.
fn mapping_key(key: YamlValue) -> Result<String, DecodeError> {
    match key {
        YamlValue::String(text) => Ok(text),
        YamlValue::Number(number) => Ok(number.to_string()),
        YamlValue::Bool(flag) => Ok(flag.to_string()),
        YamlValue::Null => Ok(String::new()),
        YamlValue::Tagged(tagged) => mapping_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(DecodeError::syntax(
            "mapping keys must be scalars",
        )),
    }
}
