use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use log::{debug, info};

use super::types::error::{Result, TranslationError};
use super::types::filetypes::FileFormat;
use super::types::models::{Delimiters, DumpArguments, Node, Tree};

/// Writes a [`Tree`] to files of one format.
#[derive(Debug)]
pub struct TranslationDumper<F: FileFormat> {
    delimiters: Delimiters,
    _format: PhantomData<F>,
}

impl<F: FileFormat> Default for TranslationDumper<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileFormat> TranslationDumper<F> {
    pub fn new() -> Self {
        Self {
            delimiters: Delimiters::default(),
            _format: PhantomData,
        }
    }

    /// Sets the context and plural delimiters (PO and MO only).
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Validates and renders `translations` without touching the filesystem.
    pub fn format(&self, translations: &Tree, arguments: &DumpArguments) -> Result<Vec<u8>> {
        validate(translations, F::NESTED)?;
        F::format(translations, &self.delimiters, arguments)
    }

    /// Writes `translations` to `path`, creating missing parent directories.
    ///
    /// # Errors
    /// - [`TranslationError::InvalidTranslations`] for empty keys, or nested
    ///   mappings in a flat format; nothing is written in that case
    /// - [`TranslationError::NotFound`] if the parent directory cannot be created
    /// - [`TranslationError::Dump`] if the file cannot be written
    pub fn dump(&self, translations: &Tree, path: impl AsRef<Path>, arguments: &DumpArguments) -> Result<&Self> {
        let path = path.as_ref();
        info!("Dumping {} {} entries to {}", translations.len(), F::DEBUG_NAME, path.display());

        validate(translations, F::NESTED)?;

        if let Some(directory) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !directory.is_dir() {
                debug!("Creating directory {}", directory.display());
                fs::create_dir_all(directory).map_err(|e| {
                    TranslationError::NotFound(format!(
                        "Unable to create directory '{}' to dump the file into: {}",
                        directory.display(),
                        e
                    ))
                })?;
            }
        }

        let content = F::format(translations, &self.delimiters, arguments)?;
        fs::write(path, &content).map_err(|source| TranslationError::Dump {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(self)
    }
}

/// Rejects empty keys at any level, and nesting when `nested` is false.
fn validate(translations: &Tree, nested: bool) -> Result<()> {
    for (key, node) in translations {
        if key.is_empty() {
            return Err(TranslationError::InvalidTranslations(
                "Translation keys must not be empty".to_string(),
            ));
        }
        if let Node::Mapping(child) = node {
            if !nested {
                return Err(TranslationError::InvalidTranslations(format!(
                    "Translations must be a flat dictionary of strings, but '{}' is a nested mapping",
                    key
                )));
            }
            validate(child, nested)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::types::filetypes::{Po, Yaml};

    #[test]
    fn rejects_empty_keys_at_any_depth() {
        let mut child = Tree::new();
        child.insert(String::new(), "x".into());
        let mut tree = Tree::new();
        tree.insert("parent".into(), Node::Mapping(child));

        let result = TranslationDumper::<Yaml>::new().format(&tree, &DumpArguments::default());
        assert!(matches!(result, Err(TranslationError::InvalidTranslations(_))));
    }

    #[test]
    fn flat_formats_reject_nesting_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new").join("messages.po");
        let mut tree = Tree::new();
        tree.insert("menu".into(), Node::Mapping(Tree::new()));

        let dumper = TranslationDumper::<Po>::new();
        let result = dumper.dump(&tree, &path, &DumpArguments::default());
        assert!(matches!(result, Err(TranslationError::InvalidTranslations(_))));
        assert!(!path.parent().unwrap().exists());
    }
}
