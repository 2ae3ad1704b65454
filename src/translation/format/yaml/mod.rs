//! The YAML subset: block mappings of quoted or bare scalars with anchors,
//! aliases and merge keys.
//!
//! # Submodules
//!
//! - [`scanner`][]: tokenizes one line
//! - [`parser`][]: builds a [`Tree`] from the token stream
//! - [`planner`][]: finds mappings worth anchoring or merging on dump
//! - [`writer`][]: renders a planned tree and cleans up its anchors

pub mod parser;
pub mod planner;
pub mod scanner;
pub mod writer;

use log::debug;

use self::parser::Parser;
use self::planner::AnchorPlan;
use self::writer::{Writer, cleanup};
use crate::translation::types::error::Result;
use crate::translation::types::models::Tree;
use crate::translation::utils::{decode_text, normalize_newlines};

/// Parses YAML content into a tree.
pub fn parse(content: &[u8]) -> Result<Tree> {
    let text = normalize_newlines(&decode_text(content, "YAML")?);
    Parser::new(&text).parse()
}

/// Renders a tree as YAML, deduplicating repeated mappings when `anchors`
/// is set.
pub fn format(translations: &Tree, anchors: bool) -> String {
    let plan = if anchors {
        AnchorPlan::build(translations)
    } else {
        debug!("YAML anchors disabled; rendering every mapping in full");
        AnchorPlan::empty()
    };
    let rendered = Writer::new(&plan).render(translations);
    cleanup(&rendered, &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::types::models::{Node, identical};

    fn flat(entries: &[(&str, &str)]) -> Node {
        Node::Mapping(entries.iter().map(|(k, v)| (k.to_string(), Node::from(*v))).collect())
    }

    #[test]
    fn scalar_and_nested_tree_round_trips_without_anchors() {
        let mut tree = Tree::new();
        tree.insert("a".into(), "1".into());
        tree.insert("b".into(), flat(&[("a", "1")]));

        let text = format(&tree, true);
        assert_eq!(text, "---\n\"a\": \"1\"\n\"b\":\n  \"a\": \"1\"\n...\n");
        assert!(!text.contains('&') && !text.contains('*'));
        assert!(identical(&parse(text.as_bytes()).unwrap(), &tree));
    }

    #[test]
    fn merged_mapping_round_trips() {
        let mut tree = Tree::new();
        tree.insert("x".into(), flat(&[("k1", "v1"), ("k2", "v2")]));
        tree.insert("y".into(), flat(&[("k1", "v1"), ("k2", "v2"), ("k3", "v3")]));

        let text = format(&tree, true);
        assert!(text.contains("\"x\": &anchor_1\n"));
        assert!(text.contains("\"y\":\n  <<: *anchor_1\n  \"k3\": \"v3\"\n"));
        assert_eq!(parse(text.as_bytes()).unwrap(), tree);
    }

    #[test]
    fn deep_repetition_round_trips() {
        let shared = flat(&[("ok", "OK"), ("cancel", "Cancel")]);
        let mut dialog = Tree::new();
        dialog.insert("buttons".into(), shared.clone());
        dialog.insert("title".into(), "Dialog".into());
        let mut tree = Tree::new();
        tree.insert("first".into(), Node::Mapping(dialog.clone()));
        tree.insert("second".into(), Node::Mapping(dialog));
        tree.insert("buttons".into(), shared);

        let text = format(&tree, true);
        assert!(text.contains("\"second\": *anchor_1\n"), "{text}");
        assert!(text.contains("\"buttons\": *anchor_2\n"), "{text}");
        assert_eq!(parse(text.as_bytes()).unwrap(), tree);
    }

    #[test]
    fn disabled_anchors_render_everything() {
        let mut tree = Tree::new();
        tree.insert("x".into(), flat(&[("k", "v")]));
        tree.insert("y".into(), flat(&[("k", "v")]));

        let text = format(&tree, false);
        assert_eq!(text, "---\n\"x\":\n  \"k\": \"v\"\n\"y\":\n  \"k\": \"v\"\n...\n");
    }

    #[test]
    fn special_keys_round_trip() {
        let mut tree = Tree::new();
        tree.insert("<<".into(), "literal".into());
        tree.insert("null".into(), "~".into());
        tree.insert("tab\tand \"quote\"".into(), "multi\nline \\ \u{1}".into());

        let text = format(&tree, true);
        assert!(identical(&parse(text.as_bytes()).unwrap(), &tree), "{text}");
    }
}
