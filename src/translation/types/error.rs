//! Custom error types for the trans-files crate.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The primary error type for all load and dump operations in this crate.
///
/// Every format reports failures through this enum so callers can handle
/// YAML, JSON, PHP, XLIFF, PO and MO resources uniformly.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// A resource (file, directory or YAML anchor) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource exists but cannot be opened or read.
    #[error("Cannot open/read the file at '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content violates the grammar of its format.
    #[error("Parsing failed: {0}")]
    Parsing(String),

    /// The content is well-formed but semantically invalid
    /// (duplicate key, bad indentation, non-UTF-8 text, bad alias target, ...).
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// The formatted content could not be written completely.
    #[error("Cannot write to the file located at '{}': {source}", path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The translations handed to a dumper failed validation.
    #[error("Invalid translations: {0}")]
    InvalidTranslations(String),
}

impl TranslationError {
    /// Attaches the resource path to a path-less format error.
    ///
    /// Format parsers work on bytes and never see the file they came from;
    /// the load scaffold re-tags their errors with it.
    pub fn with_resource(self, path: &Path) -> Self {
        let at = |message: String| format!("'{}': {}", path.display(), message);
        match self {
            Self::NotFound(message) => Self::NotFound(at(message)),
            Self::Parsing(message) => Self::Parsing(at(message)),
            Self::InvalidResource(message) => Self::InvalidResource(at(message)),
            other => other,
        }
    }
}

/// A convenience `Result` type alias using the crate's `TranslationError` type.
pub type Result<T> = std::result::Result<T, TranslationError>;
