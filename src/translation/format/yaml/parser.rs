//! Indentation-driven recursive-descent parser for the YAML subset.
//!
//! Each recursion level parses one block mapping. The first significant
//! line of a level fixes its baseline indentation; a line indented below
//! the baseline either closes the mapping (when it is back at or below the
//! parent's baseline) or is an indentation error.
//!
//! Anchors are resolved immediately: an alias can only refer to an anchor
//! defined on an earlier line, so the anchor table simply stores finished
//! nodes. While an anchored line's nested block is still being parsed, the
//! binding holds an absent scalar.

use std::collections::HashMap;

use log::trace;

use super::scanner::{self, Entry, Link};
use crate::translation::types::error::{Result, TranslationError};
use crate::translation::types::models::{Node, Tree};

pub struct Parser<'a> {
    lines: Vec<&'a str>,
    /// Index of the next physical line to read.
    cursor: usize,
    anchors: HashMap<String, Node>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over LF-separated text.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            cursor: 0,
            anchors: HashMap::new(),
        }
    }

    /// Parses the whole document into a tree.
    pub fn parse(mut self) -> Result<Tree> {
        let tree = self.parse_mapping(None)?;
        trace!("Parsed YAML document: {} top-level entries, {} anchors", tree.len(), self.anchors.len());
        Ok(tree)
    }

    /// Finds the next significant line without consuming it.
    fn peek_line(&self) -> Option<(usize, &'a str)> {
        self.lines[self.cursor.min(self.lines.len())..]
            .iter()
            .enumerate()
            .find(|(_, line)| scanner::is_significant(line))
            .map(|(offset, line)| (self.cursor + offset, *line))
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let next = self.peek_line();
        self.cursor = match next {
            Some((index, _)) => index + 1,
            None => self.lines.len(),
        };
        next
    }

    fn push_back(&mut self, index: usize) {
        self.cursor = index;
    }

    /// Whether the next significant line is indented beyond `baseline`.
    fn next_line_is_deeper(&self, baseline: usize) -> bool {
        self.peek_line()
            .is_some_and(|(_, line)| indentation(line) > baseline)
    }

    fn parse_mapping(&mut self, parent_baseline: Option<usize>) -> Result<Tree> {
        let mut tree = Tree::new();
        let mut merged: Option<Tree> = None;
        let mut baseline: Option<usize> = None;

        while let Some((index, line)) = self.next_line() {
            let line_number = index + 1;

            if line.trim_start_matches(' ').starts_with('\t') {
                return Err(invalid(line_number, "uses a tab for indentation"));
            }

            let entry = scanner::scan_line(line).ok_or_else(|| {
                TranslationError::Parsing(format!(
                    "Unsupported or invalid YAML structure detected at line {}",
                    line_number
                ))
            })?;

            let base = *baseline.get_or_insert(entry.indent);
            if entry.indent < base {
                if parent_baseline.is_some_and(|parent| entry.indent <= parent) {
                    self.push_back(index);
                    break;
                }
                return Err(invalid(line_number, "has an invalid indentation"));
            }
            if entry.indent > base {
                return Err(invalid(line_number, "has an invalid indentation"));
            }

            self.parse_entry(entry, base, line_number, &mut tree, &mut merged)?;
        }

        // A later merge key replaces the earlier source.
        if let Some(source) = merged {
            for (key, node) in source {
                tree.entry(key).or_insert(node);
            }
        }

        Ok(tree)
    }

    fn parse_entry(
        &mut self,
        entry: Entry<'a>,
        base: usize,
        line_number: usize,
        tree: &mut Tree,
        merged: &mut Option<Tree>,
    ) -> Result<()> {
        let is_merge = entry.is_merge();
        let key = entry.key.decode_key().map_err(|e| e.with_line(line_number))?;
        let value = match entry.value {
            Some(token) => token.decode_value().map_err(|e| e.with_line(line_number))?,
            None => None,
        };

        if key.is_empty() {
            return Err(invalid(line_number, "has an empty key"));
        }
        if !is_merge && tree.contains_key(&key) {
            return Err(invalid(line_number, &format!("has a duplicate key '{}'", key)));
        }
        if is_merge && !matches!(entry.link, Some(Link::Alias(_))) {
            return Err(invalid(line_number, "expected an alias because of the merge key"));
        }

        match entry.link {
            Some(Link::Alias(name)) => {
                if value.is_some() {
                    return Err(invalid(line_number, "has an invalid combination of an alias and a value"));
                }
                let target = self.anchors.get(name).cloned().ok_or_else(|| {
                    TranslationError::NotFound(format!(
                        "YAML anchor '{}' referenced at line {} does not exist",
                        name, line_number
                    ))
                })?;
                if self.next_line_is_deeper(base) {
                    let found = if is_merge { "a merge key" } else { "an alias" };
                    return Err(invalid(line_number, &format!("expects a mapping, but found {}", found)));
                }

                if is_merge {
                    match target {
                        Node::Mapping(source) => *merged = Some(source),
                        Node::Scalar(_) => {
                            return Err(invalid(line_number, "merges an alias that does not refer to a mapping"));
                        }
                    }
                } else {
                    tree.insert(key, target);
                }
                return Ok(());
            }
            Some(Link::Anchor(name)) => {
                self.anchors.insert(name.to_string(), Node::Scalar(String::new()));
            }
            None => {}
        }

        let node = if self.next_line_is_deeper(base) {
            if value.is_some() {
                return Err(invalid(line_number, "expected a mapping after a key with a value"));
            }
            Node::Mapping(self.parse_mapping(Some(base))?)
        } else {
            Node::Scalar(value.unwrap_or_default())
        };

        if let Some(Link::Anchor(name)) = entry.link {
            trace!("Binding anchor '{}' at line {}", name, line_number);
            self.anchors.insert(name.to_string(), node.clone());
        }
        tree.insert(key, node);

        Ok(())
    }
}

/// Number of leading spaces.
fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn invalid(line_number: usize, problem: &str) -> TranslationError {
    TranslationError::InvalidResource(format!("The YAML content {} at line {}", problem, line_number))
}

trait WithLine {
    fn with_line(self, line_number: usize) -> Self;
}

impl WithLine for TranslationError {
    fn with_line(self, line_number: usize) -> Self {
        match self {
            TranslationError::InvalidResource(message) => {
                TranslationError::InvalidResource(format!("{} at line {}", message, line_number))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Tree> {
        Parser::new(text).parse()
    }

    fn scalar<'t>(tree: &'t Tree, path: &[&str]) -> &'t str {
        let (last, parents) = path.split_last().unwrap();
        let mut current = tree;
        for key in parents {
            current = current[*key].as_mapping().unwrap();
        }
        current[*last].as_str().unwrap()
    }

    #[test]
    fn parses_nested_mappings() {
        let tree = parse("---\napp:\n  title: \"Demo\"\n  menu:\n    open: Open\n    close: 'Close'\nfooter: Bye\n...").unwrap();
        assert_eq!(scalar(&tree, &["app", "title"]), "Demo");
        assert_eq!(scalar(&tree, &["app", "menu", "open"]), "Open");
        assert_eq!(scalar(&tree, &["app", "menu", "close"]), "Close");
        assert_eq!(scalar(&tree, &["footer"]), "Bye");
        assert_eq!(tree.keys().collect::<Vec<_>>(), ["app", "footer"]);
    }

    #[test]
    fn absent_values_become_empty_scalars() {
        let tree = parse("a: ~\nb: null\nc:\nd: \"\"\n").unwrap();
        for key in ["a", "b", "c", "d"] {
            assert_eq!(scalar(&tree, &[key]), "");
        }
    }

    #[test]
    fn alias_copies_anchored_mapping() {
        let tree = parse("base: &b\n  x: \"1\"\n  y: \"2\"\ncopy: *b\n").unwrap();
        assert_eq!(tree["copy"], tree["base"]);
    }

    #[test]
    fn merge_key_fills_only_missing_keys() {
        let text = "base: &b\n  x: \"1\"\n  y: \"2\"\nchild:\n  y: \"override\"\n  <<: *b\n  z: \"3\"\n";
        let tree = parse(text).unwrap();
        let child = tree["child"].as_mapping().unwrap();
        assert_eq!(child["x"].as_str(), Some("1"));
        assert_eq!(child["y"].as_str(), Some("override"));
        assert_eq!(child["z"].as_str(), Some("3"));
        assert_eq!(child.keys().collect::<Vec<_>>(), ["y", "z", "x"]);
    }

    #[test]
    fn later_merge_key_replaces_earlier_source() {
        let text = "a: &a\n  x: \"1\"\nb: &b\n  y: \"2\"\nc:\n  <<: *a\n  <<: *b\n";
        let tree = parse(text).unwrap();
        let c = tree["c"].as_mapping().unwrap();
        assert_eq!(c.keys().collect::<Vec<_>>(), ["y"]);
        assert_eq!(c["y"].as_str(), Some("2"));
    }

    #[test]
    fn anchor_binding_sees_nested_content() {
        let tree = parse("a: &x\n  b:\n    c: \"d\"\ne:\n  <<: *x\n").unwrap();
        assert_eq!(tree["e"], tree["a"]);
    }

    #[test]
    fn anchor_redefinition_overwrites_binding() {
        let tree = parse("a: &x \"one\"\nb: &x \"two\"\nc: *x\n").unwrap();
        assert_eq!(scalar(&tree, &["c"]), "two");
    }

    #[test]
    fn sibling_after_nested_block_returns_to_parent() {
        let tree = parse("a:\n  b:\n    c: \"1\"\n  d: \"2\"\ne: \"3\"\n").unwrap();
        assert_eq!(scalar(&tree, &["a", "b", "c"]), "1");
        assert_eq!(scalar(&tree, &["a", "d"]), "2");
        assert_eq!(scalar(&tree, &["e"]), "3");
    }

    fn error_of(text: &str) -> TranslationError {
        parse(text).expect_err("parse should fail")
    }

    #[test]
    fn grammar_violation_names_the_line() {
        let error = error_of("ok: \"1\"\n\n- item\n");
        assert!(matches!(&error, TranslationError::Parsing(m) if m.contains("line 3")), "{error}");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let error = error_of("a: \"1\"\na: \"2\"\n");
        assert!(matches!(&error, TranslationError::InvalidResource(m) if m.contains("duplicate") && m.contains("line 2")));
    }

    #[test]
    fn dedent_between_levels_is_rejected() {
        let error = error_of("a:\n    b: \"1\"\n  c: \"2\"\n");
        assert!(matches!(&error, TranslationError::InvalidResource(m) if m.contains("indentation") && m.contains("line 3")));
    }

    #[test]
    fn deeper_line_after_scalar_is_rejected() {
        let error = error_of("a: \"1\"\n  b: \"2\"\n");
        assert!(matches!(&error, TranslationError::InvalidResource(m) if m.contains("line 1")));
    }

    #[test]
    fn top_level_dedent_is_rejected() {
        let error = error_of("  a: \"1\"\nb: \"2\"\n");
        assert!(matches!(&error, TranslationError::InvalidResource(m) if m.contains("line 2")));
    }

    #[test]
    fn unknown_alias_is_not_found() {
        assert!(matches!(error_of("a: *missing\n"), TranslationError::NotFound(_)));
    }

    #[test]
    fn alias_rule_violations_are_rejected() {
        for text in [
            "a: &x \"1\"\nb: *x \"2\"\n",
            "a: &x\n  k: \"v\"\nb: *x\n  k: \"w\"\n",
            "a: &x \"1\"\nb:\n  <<: *x\n",
            "a: &x\n  k: \"v\"\nb:\n  <<: \"v\"\n",
        ] {
            assert!(matches!(error_of(text), TranslationError::InvalidResource(_)), "{text:?}");
        }
    }

    #[test]
    fn tab_indentation_is_rejected() {
        assert!(matches!(error_of("a:\n\tb: \"1\"\n"), TranslationError::InvalidResource(_)));
    }
}
