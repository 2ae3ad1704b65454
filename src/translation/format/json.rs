//! JSON objects of strings and nested objects.

use log::trace;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter};
use serde_json::{Serializer, Value};

use crate::translation::types::error::{Result, TranslationError};
use crate::translation::types::models::{Node, Tree};
use crate::translation::utils::decode_text;

/// Parses a JSON object; `null` members are absent values.
pub fn parse(content: &[u8]) -> Result<Tree> {
    let text = decode_text(content, "JSON")?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| TranslationError::Parsing(format!("Failed to parse JSON: {}", e)))?;

    match value {
        Value::Object(members) => convert_object(members),
        other => Err(TranslationError::InvalidResource(format!(
            "The JSON document must be an object, found {}",
            kind_of(&other)
        ))),
    }
}

fn convert_object(members: serde_json::Map<String, Value>) -> Result<Tree> {
    let mut tree = Tree::with_capacity(members.len());
    for (key, value) in members {
        let node = match value {
            Value::String(text) => Node::Scalar(text),
            Value::Null => Node::Scalar(String::new()),
            Value::Object(nested) => Node::Mapping(convert_object(nested)?),
            other => {
                return Err(TranslationError::InvalidResource(format!(
                    "The JSON member '{}' must be a string or an object, found {}",
                    key,
                    kind_of(&other)
                )));
            }
        };
        tree.insert(key, node);
    }
    trace!("Converted JSON object with {} members", tree.len());
    Ok(tree)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serializes a tree, pretty-printed with four-space indentation or compact.
pub fn format(translations: &Tree, pretty: bool) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let result = if pretty {
        let mut serializer = Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(b"    "));
        translations.serialize(&mut serializer)
    } else {
        let mut serializer = Serializer::with_formatter(&mut output, CompactFormatter);
        translations.serialize(&mut serializer)
    };
    result.map_err(|e| TranslationError::InvalidTranslations(format!("Failed to encode JSON: {}", e)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_member_order_and_nulls() {
        let tree = parse(r#"{"z": "last?", "a": {"b": null}, "m": "é"}"#.as_bytes()).unwrap();
        assert_eq!(tree.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(tree["a"].as_mapping().unwrap()["b"].as_str(), Some(""));
        assert_eq!(tree["m"].as_str(), Some("é"));
    }

    #[test]
    fn rejects_non_string_members() {
        assert!(matches!(parse(br#"{"a": 1}"#), Err(TranslationError::InvalidResource(_))));
        assert!(matches!(parse(br#"["a"]"#), Err(TranslationError::InvalidResource(_))));
        assert!(matches!(parse(br#"{"a": "#), Err(TranslationError::Parsing(_))));
    }

    #[test]
    fn pretty_output_uses_four_spaces_and_raw_unicode() {
        let mut tree = Tree::new();
        tree.insert("greeting".into(), "héllo/wörld".into());
        let output = String::from_utf8(format(&tree, true).unwrap()).unwrap();
        assert_eq!(output, "{\n    \"greeting\": \"héllo/wörld\"\n}");

        let compact = String::from_utf8(format(&tree, false).unwrap()).unwrap();
        assert_eq!(compact, "{\"greeting\":\"héllo/wörld\"}");
    }
}
