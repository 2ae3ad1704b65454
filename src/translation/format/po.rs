//! Textual gettext PO catalogs.

use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use crate::translation::codec::escape::{quote, unescape};
use crate::translation::types::error::Result;
use crate::translation::types::models::{Delimiters, DumpArguments, Node, Tree};
use crate::translation::utils::{decode_text, header_fields, normalize_newlines};

/// Matches a keyword line (`msgid "..."`) or a continuation line (`"..."`).
static LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn line_regex() -> &'static Regex {
    LINE_REGEX.get_or_init(|| {
        Regex::new(r#"^(msg(?:ctxt|id|id_plural|str(?:\[\d+\])?))?[ \t]*"((?:[^"\\]|\\.)*)".*$"#)
            .expect("Invalid regex pattern")
    })
}

/// Which keyword a continuation line extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Context,
    Id,
    Str,
}

/// One translation unit being accumulated.
#[derive(Default)]
struct Unit {
    key: String,
    value: String,
    last: Option<Field>,
}

impl Unit {
    fn feed(&mut self, keyword: Option<&str>, text: &str, delimiters: &Delimiters) {
        let field = match keyword {
            Some("msgctxt") => Field::Context,
            Some("msgid") | Some("msgid_plural") => Field::Id,
            // msgstr and msgstr[n]
            Some(_) => Field::Str,
            None => self.last.unwrap_or(Field::None),
        };

        match (keyword, field) {
            (Some("msgctxt"), _) => {
                if let Some(delimiter) = &delimiters.context {
                    if !text.is_empty() {
                        self.key = format!("{}{}", text, delimiter);
                    }
                }
            }
            (Some("msgid"), _) => self.key.push_str(text),
            (Some("msgid_plural"), _) => {
                if let Some(delimiter) = &delimiters.plural {
                    self.key.push_str(delimiter);
                    self.key.push_str(text);
                }
            }
            (Some("msgstr"), _) => self.value = text.to_string(),
            (Some(_), _) => {
                // msgstr[n]
                if self.value.is_empty() {
                    self.value = text.to_string();
                } else if let Some(delimiter) = &delimiters.plural {
                    self.value.push_str(delimiter);
                    self.value.push_str(text);
                }
            }
            (None, Field::Context) => {
                if let Some(delimiter) = &delimiters.context {
                    if self.key.is_empty() && !text.is_empty() {
                        self.key = format!("{}{}", text, delimiter);
                    } else if let Some(prefix) = self.key.strip_suffix(delimiter.as_str()) {
                        self.key = format!("{}{}{}", prefix, text, delimiter);
                    }
                }
            }
            (None, Field::Id) => self.key.push_str(text),
            (None, Field::Str) => self.value.push_str(text),
            (None, Field::None) => {}
        }

        if keyword.is_some() {
            self.last = Some(field);
        }
    }

    /// Decodes the unit; the header unit (empty msgid) yields nothing.
    fn finish(self, tree: &mut Tree) -> Result<()> {
        if self.key.is_empty() {
            return Ok(());
        }
        let key = unescape(&self.key)?;
        let value = unescape(&self.value)?;
        trace!("PO entry '{}'", key);
        tree.insert(key, Node::Scalar(value));
        Ok(())
    }
}

/// Parses a PO catalog. Units are separated by blank lines.
pub fn parse(content: &[u8], delimiters: &Delimiters) -> Result<Tree> {
    let text = normalize_newlines(&decode_text(content, "PO")?);
    let mut tree = Tree::new();
    let mut unit = Unit::default();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            std::mem::take(&mut unit).finish(&mut tree)?;
            continue;
        }
        if let Some(captures) = line_regex().captures(line) {
            let keyword = captures.get(1).map(|m| m.as_str());
            let text = captures.get(2).map_or("", |m| m.as_str());
            unit.feed(keyword, text, delimiters);
        }
    }
    unit.finish(&mut tree)?;

    Ok(tree)
}

/// Renders a PO catalog: the header unit, then one unit per entry.
pub fn format(translations: &Tree, delimiters: &Delimiters, arguments: &DumpArguments) -> String {
    let mut output = String::from("msgid \"\"\nmsgstr \"\"\n");
    for (key, value) in header_fields(arguments) {
        output.push_str(&quote(&format!("{}: {}\n", key, value)));
        output.push('\n');
    }

    for (key, node) in translations {
        let value = match node {
            Node::Scalar(value) => value.as_str(),
            Node::Mapping(_) => continue,
        };
        output.push('\n');

        let mut id = key.as_str();
        if let Some(delimiter) = &delimiters.context {
            if let Some((context, rest)) = key.split_once(delimiter.as_str()) {
                output.push_str(&format!("msgctxt {}\n", quote(context)));
                id = rest;
            }
        }

        if let Some(delimiter) = &delimiters.plural {
            let ids: Vec<&str> = id.split(delimiter.as_str()).collect();
            let strs: Vec<&str> = value.split(delimiter.as_str()).collect();
            if ids.len() == 2 && strs.len() >= 2 {
                output.push_str(&format!("msgid {}\n", quote(ids[0])));
                output.push_str(&format!("msgid_plural {}\n", quote(ids[1])));
                for (index, form) in strs.iter().enumerate() {
                    output.push_str(&format!("msgstr[{}] {}\n", index, quote(form)));
                }
                continue;
            }
        }

        output.push_str(&format!("msgid {}\n", quote(id)));
        output.push_str(&format!("msgstr {}\n", quote(value)));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"# Translator comment
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

#: src/menu.c:10
msgctxt "menu"
msgid "Open"
msgstr "Ouvrir"

msgid "file"
msgid_plural "files"
msgstr[0] "fichier"
msgstr[1] "fichiers"

msgid ""
"Long "
"line"
msgstr "Ligne "
"longue\tavec tab"
"#;

    #[test]
    fn reads_context_plurals_and_continuations() {
        let tree = parse(CATALOG.as_bytes(), &Delimiters::default()).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree["menu::Open"].as_str(), Some("Ouvrir"));
        assert_eq!(tree["file|files"].as_str(), Some("fichier|fichiers"));
        assert_eq!(tree["Long line"].as_str(), Some("Ligne longue\tavec tab"));
    }

    #[test]
    fn missing_delimiters_keep_only_the_message() {
        let tree = parse(CATALOG.as_bytes(), &Delimiters::new(None, None)).unwrap();
        assert_eq!(tree["Open"].as_str(), Some("Ouvrir"));
        assert_eq!(tree["file"].as_str(), Some("fichier"));
    }

    #[test]
    fn writes_header_and_units() {
        let mut tree = Tree::new();
        tree.insert("menu::Open".into(), "Ouvrir".into());
        tree.insert("file|files".into(), "fichier|fichiers".into());
        tree.insert("a|b|c".into(), "x\"y".into());

        let output = format(&tree, &Delimiters::default(), &DumpArguments::default());
        assert!(output.starts_with("msgid \"\"\nmsgstr \"\"\n\"MIME-Version: 1.0\\n\"\n"));
        assert!(output.contains("\nmsgctxt \"menu\"\nmsgid \"Open\"\nmsgstr \"Ouvrir\"\n"));
        assert!(output.contains(
            "\nmsgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"fichier\"\nmsgstr[1] \"fichiers\"\n"
        ));
        assert!(output.contains("\nmsgid \"a|b|c\"\nmsgstr \"x\\\"y\"\n"));

        assert_eq!(parse(output.as_bytes(), &Delimiters::default()).unwrap(), tree);
    }
}
