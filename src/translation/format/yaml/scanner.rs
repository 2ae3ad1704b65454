//! Single-line tokenizer for the YAML subset.
//!
//! Every significant line has the shape
//!
//! ```text
//! <indent><key>:[ <&anchor|*alias>][ <value>][ # comment]
//! ```
//!
//! where key and value are double-quoted, single-quoted or bare. Quoted
//! forms are tried before the bare form. Bare tokens may not contain any
//! byte of [`RESERVED`]. The link, the value and the comment must each be
//! preceded by a blank.

use std::ops::Range;

use crate::translation::codec::escape;
use crate::translation::types::error::Result;

/// Bytes that may not appear in a bare key or value.
pub const RESERVED: &[u8] = b"-?:,[]{}#&*!|>'\"%@`";

/// The merge key, recognised only in bare form.
pub const MERGE_KEY: &str = "<<";

/// A key or value token as written on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Content between double quotes, escapes not yet decoded.
    Double(&'a str),
    /// Content between single quotes, `''` not yet collapsed.
    Single(&'a str),
    /// Bare text with trailing blanks trimmed.
    Bare(&'a str),
}

impl<'a> Token<'a> {
    /// Decodes the token as a value; bare `null`, `~` and empty are absent.
    pub fn decode_value(&self) -> Result<Option<String>> {
        match *self {
            Token::Double(inner) => escape::unescape(inner).map(Some),
            Token::Single(inner) => Ok(Some(inner.replace("''", "'"))),
            Token::Bare(text) => {
                if text.is_empty() || text == "~" || text.eq_ignore_ascii_case("null") {
                    Ok(None)
                } else {
                    Ok(Some(text.to_string()))
                }
            }
        }
    }

    /// Decodes the token as a key; bare `null` and `~` stay literal.
    pub fn decode_key(&self) -> Result<String> {
        match *self {
            Token::Bare(text) => Ok(text.to_string()),
            _ => Ok(self.decode_value()?.unwrap_or_default()),
        }
    }
}

/// An anchor definition or alias reference attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link<'a> {
    Anchor(&'a str),
    Alias(&'a str),
}

/// One tokenized mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Number of leading spaces.
    pub indent: usize,
    pub key: Token<'a>,
    pub link: Option<Link<'a>>,
    /// Byte range of the link (sigil included) within the line.
    pub link_span: Option<Range<usize>>,
    pub value: Option<Token<'a>>,
}

impl<'a> Entry<'a> {
    pub fn is_merge(&self) -> bool {
        self.key == Token::Bare(MERGE_KEY)
    }
}

/// Returns `false` for blank lines, comments, directives and document markers.
pub fn is_significant(line: &str) -> bool {
    let content = line.trim_start_matches(' ');
    !(content.is_empty()
        || content.starts_with('%')
        || content.starts_with('#')
        || content.starts_with("---")
        || content.starts_with("..."))
}

/// Tokenizes one line, or returns `None` if it does not match the grammar.
pub fn scan_line(line: &str) -> Option<Entry<'_>> {
    LineScanner::new(line).scan()
}

struct LineScanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            pos: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn advance(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    /// Skip spaces and tabs, returning how many were skipped.
    fn skip_blanks(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.advance();
        }
        self.pos - start
    }

    /// Whether the byte just before the cursor is a blank.
    fn after_blank(&self) -> bool {
        self.pos > 0 && matches!(self.bytes[self.pos - 1], b' ' | b'\t')
    }

    fn scan(mut self) -> Option<Entry<'a>> {
        while self.peek() == Some(b' ') {
            self.advance();
        }
        let indent = self.pos;

        let key = self.scan_scalar()?;
        if self.peek() != Some(b':') {
            return None;
        }
        self.advance();

        let mut link = None;
        let mut link_span = None;
        if self.skip_blanks() > 0 && matches!(self.peek(), Some(b'&' | b'*')) {
            let (parsed, span) = self.scan_link()?;
            link = Some(parsed);
            link_span = Some(span);
            self.skip_blanks();
        }

        let mut value = None;
        if self.after_blank() && self.peek().is_some_and(|b| b != b'#') {
            value = Some(self.scan_scalar()?);
            self.skip_blanks();
        }

        if self.peek() == Some(b'#') {
            if !self.after_blank() {
                return None;
            }
            self.pos = self.bytes.len();
        }

        if self.pos != self.bytes.len() {
            return None;
        }

        Some(Entry {
            indent,
            key,
            link,
            link_span,
            value,
        })
    }

    fn scan_scalar(&mut self) -> Option<Token<'a>> {
        match self.peek()? {
            b'"' => self.scan_double_quoted(),
            b'\'' => self.scan_single_quoted(),
            _ => self.scan_bare(),
        }
    }

    fn scan_double_quoted(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    self.advance();
                    return Some(Token::Double(&self.line[start + 1..self.pos - 1]));
                }
                b'\\' => {
                    self.advance();
                    self.peek()?;
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        None
    }

    fn scan_single_quoted(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        while let Some(b) = self.peek() {
            if b == b'\'' {
                if self.peek_at(1) == Some(b'\'') {
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    return Some(Token::Single(&self.line[start + 1..self.pos - 1]));
                }
            } else {
                self.advance();
            }
        }

        None
    }

    fn scan_bare(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(|b| !RESERVED.contains(&b)) {
            self.advance();
        }
        if self.pos == start {
            return None;
        }
        let text = self.line[start..self.pos].trim_end_matches([' ', '\t']);
        Some(Token::Bare(text))
    }

    fn scan_link(&mut self) -> Option<(Link<'a>, Range<usize>)> {
        let start = self.pos;
        let sigil = self.peek()?;
        self.advance();

        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            self.advance();
        }
        if self.pos == name_start {
            return None;
        }

        let name = &self.line[name_start..self.pos];
        let link = if sigil == b'&' {
            Link::Anchor(name)
        } else {
            Link::Alias(name)
        };
        Some((link, start..self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_bare_entry_with_comment() {
        let entry = scan_line("  greeting: Hello there  # note").unwrap();
        assert_eq!(entry.indent, 2);
        assert_eq!(entry.key, Token::Bare("greeting"));
        assert_eq!(entry.value, Some(Token::Bare("Hello there")));
        assert_eq!(entry.link, None);
    }

    #[test]
    fn scans_quoted_forms_and_links() {
        let entry = scan_line(r#""a \"b\"": &base_1"#).unwrap();
        assert_eq!(entry.key, Token::Double(r#"a \"b\""#));
        assert_eq!(entry.link, Some(Link::Anchor("base_1")));
        assert_eq!(entry.link_span, Some(11..18));

        let entry = scan_line("'it''s': *x 'v'").unwrap();
        assert_eq!(entry.key.decode_key().unwrap(), "it's");
        assert_eq!(entry.link, Some(Link::Alias("x")));
        assert_eq!(entry.value, Some(Token::Single("v")));
    }

    #[test]
    fn recognises_only_bare_merge_key() {
        assert!(scan_line("<<: *base").unwrap().is_merge());
        assert!(!scan_line("\"<<\": *base").unwrap().is_merge());
    }

    #[test]
    fn rejects_lines_outside_the_grammar() {
        for line in [
            "key:value",
            "key: value#comment",
            "my-key: value",
            "key: [a, b]",
            "key: \"unterminated",
            "key: &",
            "key: *a\"b\"",
            "- item",
            "\"k\" : v",
        ] {
            assert!(scan_line(line).is_none(), "{line:?} should be rejected");
        }
    }

    #[test]
    fn decodes_absent_values_but_literal_keys() {
        let entry = scan_line("null: ~").unwrap();
        assert_eq!(entry.key.decode_key().unwrap(), "null");
        assert_eq!(entry.value.unwrap().decode_value().unwrap(), None);

        let entry = scan_line("k: NULL").unwrap();
        assert_eq!(entry.value.unwrap().decode_value().unwrap(), None);

        let entry = scan_line("k: \"null\"").unwrap();
        assert_eq!(entry.value.unwrap().decode_value().unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn filters_insignificant_lines() {
        assert!(!is_significant(""));
        assert!(!is_significant("    "));
        assert!(!is_significant("  # comment"));
        assert!(!is_significant("---"));
        assert!(!is_significant("..."));
        assert!(!is_significant("%YAML 1.2"));
        assert!(is_significant("  key: value"));
    }
}
