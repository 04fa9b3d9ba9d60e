//! INI decoding with typed scalars, plus a renderer for shallow trees.
//!
//! Dialect:
//! - `;` and `#` start comment lines;
//! - `[section]` opens a top-level map, keys before any section are
//!   top-level;
//! - `key[] = v` appends to a sequence and `key[name] = v` fills a nested map;
//! - unquoted values are typed: `true`/`on`/`yes`, `false`/`off`/`no`/`none`,
//!   `null`, integers and decimals; quoted values stay strings.

use std::fmt::Write as _;

use serde_json::{Map, Number, Value};

use super::{DecodeError, Decoder, Format, as_text};
use crate::tree::ConfigTree;

/// Decoder for INI documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniDecoder;

impl Decoder for IniDecoder {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn decode(&self, input: &[u8]) -> Result<ConfigTree, DecodeError> {
        parse_ini(as_text(input)?)
    }
}

fn parse_ini(text: &str) -> Result<ConfigTree, DecodeError> {
    let mut root = Map::new();
    let mut section: Option<String> = None;
    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = validate_key(header.trim(), line_no)?;
            if !root.get(name).is_some_and(Value::is_object) {
                root.insert(name.to_owned(), Value::Object(Map::new()));
            }
            section = Some(name.to_owned());
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            DecodeError::syntax(format!("line {line_no}: expected `key = value`"))
        })?;
        let target = match section.as_deref() {
            Some(name) => root
                .get_mut(name)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| DecodeError::syntax(format!("line {line_no}: lost section")))?,
            None => &mut root,
        };
        insert_entry(target, key.trim(), typed_value(value.trim()), line_no)?;
    }
    Ok(Value::Object(root))
}

fn validate_key(key: &str, line_no: usize) -> Result<&str, DecodeError> {
    if key.is_empty() || key.chars().any(char::is_control) {
        return Err(DecodeError::syntax(format!("line {line_no}: invalid key")));
    }
    Ok(key)
}

fn insert_entry(
    target: &mut Map<String, Value>,
    key: &str,
    value: Value,
    line_no: usize,
) -> Result<(), DecodeError> {
    if let Some(base) = key.strip_suffix("[]") {
        let slot = container(target, validate_key(base.trim(), line_no)?, Value::Array);
        if let Value::Array(items) = slot {
            items.push(value);
        }
        return Ok(());
    }
    if let Some((base, rest)) = key.split_once('[') {
        if let Some(inner) = rest.strip_suffix(']') {
            let slot = container(target, validate_key(base.trim(), line_no)?, Value::Object);
            if let Value::Object(entries) = slot {
                entries.insert(validate_key(inner.trim(), line_no)?.to_owned(), value);
            }
            return Ok(());
        }
    }
    target.insert(validate_key(key, line_no)?.to_owned(), value);
    Ok(())
}

/// Fetch `key`, replacing it with an empty container of the wanted kind when
/// it holds something else.
fn container<'m, T: Default>(
    target: &'m mut Map<String, Value>,
    key: &str,
    wrap: fn(T) -> Value,
) -> &'m mut Value {
    let empty = wrap(T::default());
    let slot = target.entry(key.to_owned()).or_insert(Value::Null);
    if std::mem::discriminant(slot) != std::mem::discriminant(&empty) {
        *slot = empty;
    }
    slot
}

fn typed_value(raw: &str) -> Value {
    if let Some(quoted) = unquote(raw) {
        return Value::String(quoted.to_owned());
    }
    let bare = raw.split_once(';').map_or(raw, |(value, _comment)| value).trim();
    match bare.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Value::Bool(true),
        "false" | "off" | "no" | "none" => Value::Bool(false),
        "null" => Value::Null,
        _ => typed_number(bare).unwrap_or_else(|| Value::String(bare.to_owned())),
    }
}

fn typed_number(bare: &str) -> Option<Value> {
    if let Ok(int) = bare.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    if !bare.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    bare.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn unquote(raw: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.split_once(quote))
            .map(|(inner, _)| inner)
    })
}

/// Render a tree in the INI dialect understood by [`IniDecoder`].
///
/// Top-level scalars come first, then one `[section]` per top-level map.
/// Sequences of scalars become `key[] = …` lines and maps one level below a
/// section become `key[name] = …` lines.
///
/// # Errors
///
/// Returns a message when the tree is not a map or nests deeper than the
/// dialect can express.
pub fn render_ini(tree: &ConfigTree) -> Result<String, String> {
    let Value::Object(root) = tree else {
        return Err("INI output requires a map at the root".to_owned());
    };
    let mut out = String::new();
    let mut sections = Vec::new();
    for (key, value) in root {
        match value {
            Value::Object(section) => sections.push((key, section)),
            other => write_entry(&mut out, key, other, false)?,
        }
    }
    for (name, section) in sections {
        if !out.is_empty() {
            out.push('\n');
        }
        writeln!(out, "[{name}]").map_err(|err| err.to_string())?;
        for (key, value) in section {
            write_entry(&mut out, key, value, true)?;
        }
    }
    Ok(out)
}

fn write_entry(out: &mut String, key: &str, value: &Value, nested: bool) -> Result<(), String> {
    match value {
        Value::Array(items) => {
            for item in items {
                writeln!(out, "{key}[] = {}", render_scalar(item, key)?)
                    .map_err(|err| err.to_string())?;
            }
        }
        Value::Object(entries) if nested => {
            for (name, item) in entries {
                writeln!(out, "{key}[{name}] = {}", render_scalar(item, key)?)
                    .map_err(|err| err.to_string())?;
            }
        }
        Value::Object(_) => return Err(format!("'{key}' nests too deeply for INI output")),
        scalar => {
            writeln!(out, "{key} = {}", render_scalar(scalar, key)?)
                .map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

fn render_scalar(value: &Value, key: &str) -> Result<String, String> {
    match value {
        Value::Null => Ok("null".to_owned()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(format!("\"{text}\"")),
        Value::Array(_) | Value::Object(_) => {
            Err(format!("'{key}' nests too deeply for INI output"))
        }
    }
}
