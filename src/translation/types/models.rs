//! Core data structures shared by every translation format.
//!
//! This module defines:
//! - The translation tree (`Tree` / `Node`)
//! - Context and plural delimiters used by the gettext formats
//! - Per-call dump arguments

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered translation dictionary: key → scalar or nested dictionary.
///
/// Equality (`==`) compares entries regardless of their order. Use
/// [`identical`] when order matters too.
pub type Tree = IndexMap<String, Node>;

/// A single value inside a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(String),
    Mapping(Tree),
}

impl Node {
    /// Returns the scalar text, or `None` for nested mappings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(value) => Some(value),
            Node::Mapping(_) => None,
        }
    }

    /// Returns the nested mapping, or `None` for scalars.
    pub fn as_mapping(&self) -> Option<&Tree> {
        match self {
            Node::Scalar(_) => None,
            Node::Mapping(tree) => Some(tree),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(value)
    }
}

impl From<Tree> for Node {
    fn from(tree: Tree) -> Self {
        Node::Mapping(tree)
    }
}

/// Order-sensitive structural equality: same keys, same values, same order.
pub fn identical(a: &Tree, b: &Tree) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|((key_a, node_a), (key_b, node_b))| {
            key_a == key_b
                && match (node_a, node_b) {
                    (Node::Scalar(x), Node::Scalar(y)) => x == y,
                    (Node::Mapping(x), Node::Mapping(y)) => identical(x, y),
                    _ => false,
                }
        })
}

/// Delimiters used to flatten gettext message context and plural forms
/// into dictionary keys and values.
///
/// With the defaults, `msgctxt "menu"` + `msgid "Open"` becomes the key
/// `menu::Open`, and the plural pair `msgid "file"` / `msgid_plural "files"`
/// becomes `file|files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    /// `None` drops message context on load and disables its detection on dump.
    pub context: Option<String>,
    /// `None` keeps only the singular form on load and disables plural
    /// detection on dump.
    pub plural: Option<String>,
}

impl Delimiters {
    /// Creates delimiters; empty strings are treated as "no delimiter".
    pub fn new(context: Option<&str>, plural: Option<&str>) -> Self {
        let normalize = |d: Option<&str>| d.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            context: normalize(context),
            plural: normalize(plural),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(Some("::"), Some("|"))
    }
}

/// Per-call formatting options. Each format reads only the fields it needs.
#[derive(Debug, Clone)]
pub struct DumpArguments {
    /// YAML: share repeated mappings through anchors, aliases and merge keys.
    pub anchors: bool,
    /// JSON: pretty-print with four-space indentation.
    pub pretty: bool,
    /// PO/MO: extra header fields, written after the defaults.
    pub metadata: IndexMap<String, String>,
    /// PO/MO: language code; adds `Language` and `Plural-Forms` header fields.
    pub language: Option<String>,
    /// XLIFF: source locale (`_` is rewritten to `-`).
    pub source_locale: String,
    /// XLIFF: target locale (`_` is rewritten to `-`).
    pub target_locale: String,
    /// XLIFF: write version 1.2 instead of 2.0.
    pub legacy: bool,
    /// XLIFF 2.0: the `<file id>` attribute.
    pub file_id: String,
}

impl Default for DumpArguments {
    fn default() -> Self {
        Self {
            anchors: true,
            pretty: true,
            metadata: IndexMap::new(),
            language: None,
            source_locale: "en".to_string(),
            target_locale: "en".to_string(),
            legacy: false,
            file_id: "f1".to_string(),
        }
    }
}

impl DumpArguments {
    pub fn with_anchors(mut self, anchors: bool) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_locales(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_locale = source.into();
        self.target_locale = target.into();
        self
    }

    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = file_id.into();
        self
    }
}

/// Handler invoked for every absent or empty leaf during load.
///
/// Receives the entry key and the resource path, returns the substitute.
pub type MissingValueHandler = Box<dyn Fn(&str, &std::path::Path) -> String + Send + Sync>;
