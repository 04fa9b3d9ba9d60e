//! JSON decoding.

use super::{DecodeError, Decoder, Format, as_text};
use crate::tree::ConfigTree;

/// Decoder for JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn format(&self) -> Format {
        Format::Json
    }

    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError> {
        serde_json::from_str(as_text(input)?).map_err(DecodeError::syntax)
    }
}
