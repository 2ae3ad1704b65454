//! C-style string escaping shared by the YAML and PO formats.
//!
//! - [`escape`] quotes control characters, `"` and `\`: named escapes for
//!   `\a \b \t \n \v \f \r`, three-digit octal for the rest.
//! - [`unescape`] decodes named, octal (`\NNN`) and hex (`\xHH`) escapes;
//!   any other escaped character stands for itself.

use crate::translation::types::error::{Result, TranslationError};

/// Escapes control characters (0x00–0x1F), `"` and `\`.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\x07' => escaped.push_str("\\a"),
            '\x08' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\x0b' => escaped.push_str("\\v"),
            '\x0c' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\{:03o}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Wraps [`escape`]d text in double quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Decodes C-style escape sequences.
///
/// Octal and hex escapes produce raw bytes, so the decoded result is
/// validated as UTF-8.
pub fn unescape(value: &str) -> Result<String> {
    if !value.contains('\\') {
        return Ok(value.to_string());
    }

    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' || i + 1 >= bytes.len() {
            decoded.push(b);
            i += 1;
            continue;
        }

        i += 1;
        let escaped = bytes[i];
        match escaped {
            b'n' => decoded.push(b'\n'),
            b't' => decoded.push(b'\t'),
            b'r' => decoded.push(b'\r'),
            b'a' => decoded.push(0x07),
            b'v' => decoded.push(0x0b),
            b'b' => decoded.push(0x08),
            b'f' => decoded.push(0x0c),
            b'x' if bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take(2)
                    .take_while(|d| d.is_ascii_hexdigit())
                    .count();
                decoded.push(parse_radix(&bytes[i + 1..=i + digits], 16));
                i += digits;
            }
            b'0'..=b'7' => {
                let digits = bytes[i..]
                    .iter()
                    .take(3)
                    .take_while(|d| (b'0'..=b'7').contains(*d))
                    .count();
                decoded.push(parse_radix(&bytes[i..i + digits], 8));
                i += digits - 1;
            }
            other => decoded.push(other),
        }
        i += 1;
    }

    String::from_utf8(decoded).map_err(|_| {
        TranslationError::InvalidResource(format!(
            "Escape sequences in {:?} decode to invalid UTF-8",
            value
        ))
    })
}

fn parse_radix(digits: &[u8], radix: u32) -> u8 {
    digits.iter().fold(0u32, |acc, d| {
        acc * radix + (*d as char).to_digit(radix).unwrap_or(0)
    }) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_controls_quotes_and_backslashes() {
        assert_eq!(escape("a\"b\\c\nd\x01"), "a\\\"b\\\\c\\nd\\001");
        assert_eq!(quote("héllo"), "\"héllo\"");
    }

    #[test]
    fn unescapes_named_octal_and_hex_sequences() {
        assert_eq!(unescape("line\\nnext\\t\\\"q\\\"").unwrap(), "line\nnext\t\"q\"");
        assert_eq!(unescape("\\101\\x42\\q").unwrap(), "ABq");
        assert_eq!(unescape("trailing\\").unwrap(), "trailing\\");
        assert_eq!(unescape("\\xZZ").unwrap(), "xZZ");
    }

    #[test]
    fn escape_then_unescape_restores_text() {
        let original = "tab\there \"quoted\" back\\slash bell\x07 nul\0 ü";
        assert_eq!(unescape(&escape(original)).unwrap(), original);
    }

    #[test]
    fn rejects_escapes_producing_invalid_utf8() {
        assert!(matches!(
            unescape("\\xff"),
            Err(TranslationError::InvalidResource(_))
        ));
    }
}
