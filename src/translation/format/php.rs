//! PHP files that `return` an array literal.
//!
//! Only the literal subset the dumper writes is understood: string keys,
//! string values and nested arrays in either `[...]` or `array(...)`
//! syntax, with single- or double-quoted strings and comments.

use log::trace;

use crate::translation::codec::escape;
use crate::translation::types::error::{Result, TranslationError};
use crate::translation::types::models::{Node, Tree};
use crate::translation::utils::decode_text;

/// Parses `<?php return [...];` into a tree.
pub fn parse(content: &[u8]) -> Result<Tree> {
    let text = decode_text(content, "PHP")?;
    let mut cursor = Cursor::new(&text);

    cursor.skip_trivia();
    if !cursor.eat("<?php") {
        return Err(cursor.error("expected the '<?php' open tag"));
    }
    cursor.skip_trivia();
    if !cursor.eat_keyword("return") {
        return Err(cursor.error("expected a 'return' statement"));
    }
    cursor.skip_trivia();
    let tree = cursor.parse_array()?;
    cursor.skip_trivia();
    if !cursor.eat(";") {
        return Err(cursor.error("expected ';' after the returned array"));
    }
    cursor.skip_trivia();
    cursor.eat("?>");
    cursor.skip_trivia();
    if !cursor.at_end() {
        return Err(cursor.error("unexpected content after the return statement"));
    }

    Ok(tree)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn error(&self, problem: &str) -> TranslationError {
        let line = self.text[..self.pos].matches('\n').count() + 1;
        TranslationError::Parsing(format!("PHP array literal {} at line {}", problem, line))
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Like [`eat`](Self::eat), case-insensitive and not followed by an
    /// identifier character.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let matches = rest.len() >= keyword.len()
            && rest[..keyword.len()].eq_ignore_ascii_case(keyword)
            && !rest[keyword.len()..]
                .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_');
        if matches {
            self.pos += keyword.len();
        }
        matches
    }

    /// Skips whitespace and `//`, `#` and `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.pos = self.text.len() - trimmed.len();

            if trimmed.starts_with("//") || (trimmed.starts_with('#') && !trimmed.starts_with("#[")) {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                let end = body.find("*/").map(|i| i + 4).unwrap_or(trimmed.len());
                self.pos += end;
            } else {
                break;
            }
        }
    }

    fn parse_array(&mut self) -> Result<Tree> {
        let close = if self.eat("[") {
            "]"
        } else if self.eat_keyword("array") {
            self.skip_trivia();
            if !self.eat("(") {
                return Err(self.error("expected '(' after 'array'"));
            }
            ")"
        } else {
            return Err(self.error("expected an array"));
        };

        let mut tree = Tree::new();
        loop {
            self.skip_trivia();
            if self.eat(close) {
                break;
            }

            let key = self.parse_string()?;
            self.skip_trivia();
            if !self.eat("=>") {
                return Err(self.error("expected '=>' after a key"));
            }
            self.skip_trivia();

            let node = if self.rest().starts_with(['\'', '"']) {
                Node::Scalar(self.parse_string()?)
            } else if self.eat_keyword("null") {
                Node::Scalar(String::new())
            } else {
                Node::Mapping(self.parse_array()?)
            };
            trace!("PHP entry '{}'", key);
            tree.insert(key, node);

            self.skip_trivia();
            if !self.eat(",") {
                self.skip_trivia();
                if !self.eat(close) {
                    return Err(self.error(&format!("expected ',' or '{}'", close)));
                }
                break;
            }
        }

        Ok(tree)
    }

    fn parse_string(&mut self) -> Result<String> {
        let rest = self.rest();
        let quote = match rest.chars().next() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(self.error("expected a quoted string")),
        };

        let body = &rest[1..];
        let mut escaped = false;
        let mut end = None;
        for (i, c) in body.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                end = Some(i);
                break;
            }
        }
        let end = end.ok_or_else(|| self.error("has an unterminated string"))?;
        let raw = &body[..end];
        self.pos += end + 2;

        if quote == '\'' {
            Ok(unescape_single_quoted(raw))
        } else {
            if raw.contains('$') {
                return Err(self.error("uses variable interpolation"));
            }
            escape::unescape(raw)
        }
    }
}

/// In single-quoted PHP strings only `\\` and `\'` are escapes.
fn unescape_single_quoted(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek().filter(|&&next| next == '\\' || next == '\'') {
                value.push(next);
                chars.next();
                continue;
            }
        }
        value.push(c);
    }
    value
}

fn quote_single(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Renders a tree as a PHP file returning a short-syntax array.
pub fn format(translations: &Tree) -> String {
    let mut output = String::from("<?php\n\nreturn ");
    write_array(translations, 1, &mut output);
    output.push_str(";\n");
    output
}

fn write_array(tree: &Tree, depth: usize, output: &mut String) {
    let indent = "\t".repeat(depth);
    output.push_str("[\n");
    for (key, node) in tree {
        output.push_str(&indent);
        output.push_str(&quote_single(key));
        output.push_str(" => ");
        match node {
            Node::Scalar(value) => output.push_str(&quote_single(value)),
            Node::Mapping(child) => write_array(child, depth + 1, output),
        }
        output.push_str(",\n");
    }
    output.push_str(&"\t".repeat(depth - 1));
    output.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_nested_arrays_with_tabs() {
        let mut nested = Tree::new();
        nested.insert("it's".into(), "c:\\dir".into());
        let mut tree = Tree::new();
        tree.insert("a".into(), "1".into());
        tree.insert("b".into(), Node::Mapping(nested));

        assert_eq!(
            format(&tree),
            "<?php\n\nreturn [\n\t'a' => '1',\n\t'b' => [\n\t\t'it\\'s' => 'c:\\\\dir',\n\t],\n];\n"
        );
        assert_eq!(parse(format(&tree).as_bytes()).unwrap(), tree);
    }

    #[test]
    fn reads_long_syntax_comments_and_double_quotes() {
        let source = "<?php\n// messages\nreturn array(\n  \"title\" => \"Tab\\there\", # inline\n  'menu' => array('open' => 'Open', 'none' => null),\n);\n";
        let tree = parse(source.as_bytes()).unwrap();
        assert_eq!(tree["title"].as_str(), Some("Tab\there"));
        let menu = tree["menu"].as_mapping().unwrap();
        assert_eq!(menu["open"].as_str(), Some("Open"));
        assert_eq!(menu["none"].as_str(), Some(""));
    }

    #[test]
    fn rejects_anything_but_an_array_literal() {
        for source in ["<?php return 42;", "return [];", "<?php return ['a' => 'b']", "<?php return ['a' => \"$x\"];"] {
            assert!(matches!(parse(source.as_bytes()), Err(TranslationError::Parsing(_))), "{source:?}");
        }
    }
}
