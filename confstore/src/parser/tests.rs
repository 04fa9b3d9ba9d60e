//! Chain-level behaviour of the content parser: priority order, rejection of
//! degenerate results and failure reporting.

use std::sync::Arc;

use rstest::rstest;
use serde_json::{Value, json};

use super::{ContentParser, DecodeError, DecodeFailure, Decoder, Format, render_failures};
use crate::constants::ConstantRegistry;
use crate::tree::ConfigTree;

/// Decoder that returns a canned value regardless of input.
struct Canned(Format, Value);

impl Decoder for Canned {
    fn format(&self) -> Format {
        self.0
    }

    fn decode(&self, _input: &[u8]) -> Result<ConfigTree, DecodeError> {
        Ok(self.1.clone())
    }
}

/// Decoder that echoes its input as a string.
struct Parrot;

impl Decoder for Parrot {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError> {
        Ok(Value::String(String::from_utf8_lossy(input).into_owned()))
    }
}

#[rstest]
#[case::yaml("server:\n  port: 8080\n", Format::Yaml, json!({"server": {"port": 8080}}))]
#[case::json_subset_goes_to_yaml(r#"{"port": 8080}"#, Format::Yaml, json!({"port": 8080}))]
#[case::json_duplicate_keys(r#"{"a": 1, "a": 2}"#, Format::Json, json!({"a": 2}))]
#[case::ini("[server]\nport = 8080\n", Format::Ini, json!({"server": {"port": 8080}}))]
#[case::single_line_ini("port=8080", Format::Ini, json!({"port": 8080}))]
#[case::sequence("- a\n- b\n", Format::Yaml, json!(["a", "b"]))]
fn picks_first_acceptable_decoder(
    #[case] input: &str,
    #[case] format: Format,
    #[case] expected: Value,
) {
    let parsed = ContentParser::new().parse(input.as_bytes());
    let outcome = parsed.map(|p| (p.format, p.tree));
    assert_eq!(outcome, Ok((format, expected)));
}

#[rstest]
#[case::plain_word("hello")]
#[case::number("42")]
#[case::empty("")]
#[case::empty_map("{}")]
#[case::glob_like("*.nomatch")]
fn rejects_content_without_structure(#[case] input: &str) {
    let failures = ContentParser::new()
        .parse(input.as_bytes())
        .err()
        .unwrap_or_default();
    let formats: Vec<Format> = failures.iter().map(|failure| failure.format).collect();
    assert_eq!(
        formats,
        [Format::Yaml, Format::Json, Format::Ini, Format::Binary]
    );
}

#[test]
fn echoing_decoder_is_skipped() {
    let parser = ContentParser::from_decoders(vec![
        Box::new(Parrot),
        Box::new(Canned(Format::Json, json!({"ok": true}))),
    ]);
    let parsed = parser.parse(b"anything");
    assert_eq!(parsed.map(|p| p.tree), Ok(json!({"ok": true})));
}

#[test]
fn echo_is_reported_separately_from_unstructured_values() {
    let parser = ContentParser::from_decoders(vec![
        Box::new(Parrot),
        Box::new(Canned(Format::Json, json!(42))),
    ]);
    assert_eq!(
        parser.parse(b"word"),
        Err(vec![
            DecodeFailure {
                format: Format::Yaml,
                error: DecodeError::Echo
            },
            DecodeFailure {
                format: Format::Json,
                error: DecodeError::Unstructured
            },
        ])
    );
}

#[test]
fn first_success_wins_without_combining() {
    let parser = ContentParser::from_decoders(vec![
        Box::new(Canned(Format::Yaml, json!({"a": 1}))),
        Box::new(Canned(Format::Json, json!({"b": 2}))),
    ]);
    assert_eq!(parser.parse(b"x").map(|p| p.tree), Ok(json!({"a": 1})));
}

#[test]
fn unknown_constant_fails_the_whole_document() {
    let registry = ConstantRegistry::new().with("Level", "INFO", json!(200));
    let parser = ContentParser::with_constants(Arc::new(registry));
    let failures = parser
        .parse(b"level: !const Level::TRACE\nother: 1\n")
        .err()
        .unwrap_or_default();
    assert_eq!(
        failures.first().map(|failure| &failure.error),
        Some(&DecodeError::UnknownConstant {
            reference: "Level::TRACE".into()
        })
    );
    assert_eq!(failures.len(), 4);
}

#[test]
fn non_utf8_input_skips_text_decoders() {
    let failures = ContentParser::new()
        .parse(&[0xc3, 0x28, 0xa0])
        .err()
        .unwrap_or_default();
    let text_errors: Vec<&DecodeError> = failures
        .iter()
        .filter(|failure| failure.format != Format::Binary)
        .map(|failure| &failure.error)
        .collect();
    assert_eq!(text_errors, [&DecodeError::NotUtf8; 3]);
}

#[test]
fn failures_render_on_one_line() {
    let failures = vec![
        DecodeFailure {
            format: Format::Yaml,
            error: DecodeError::Echo,
        },
        DecodeFailure {
            format: Format::Ini,
            error: DecodeError::syntax("line 1: expected `key = value`"),
        },
    ];
    assert_eq!(
        render_failures(&failures),
        "yaml: decoder echoed its input; ini: line 1: expected `key = value`"
    );
    assert_eq!(render_failures(&[]), "no decoders configured");
}

#[test]
fn debug_lists_formats_in_order() {
    let rendered = format!("{:?}", ContentParser::new());
    assert_eq!(rendered, "ContentParser { formats: [Yaml, Json, Ini, Binary] }");
}
