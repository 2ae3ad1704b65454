use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use log::{debug, info};

use super::types::error::{Result, TranslationError};
use super::types::filetypes::FileFormat;
use super::types::models::{Delimiters, MissingValueHandler, Node, Tree};

/// Loads translation files of one format into a [`Tree`].
///
/// Every empty leaf of the parsed tree (absent values included) is passed
/// to the missing-value handler, which by default substitutes the key.
pub struct TranslationLoader<F: FileFormat> {
    delimiters: Delimiters,
    missing_value: Option<MissingValueHandler>,
    _format: PhantomData<F>,
}

impl<F: FileFormat> Default for TranslationLoader<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileFormat> TranslationLoader<F> {
    pub fn new() -> Self {
        Self {
            delimiters: Delimiters::default(),
            missing_value: None,
            _format: PhantomData,
        }
    }

    /// Sets the context and plural delimiters (PO and MO only).
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Replaces the default missing-value handler.
    ///
    /// The handler receives the entry key and the path of the loaded file.
    pub fn with_missing_value_handler<H>(mut self, handler: H) -> Self
    where
        H: Fn(&str, &Path) -> String + Send + Sync + 'static,
    {
        self.missing_value = Some(Box::new(handler));
        self
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// - [`TranslationError::NotFound`] if `path` is not an existing file
    /// - [`TranslationError::Load`] if it cannot be read
    /// - [`TranslationError::Parsing`] or [`TranslationError::InvalidResource`]
    ///   if its content is malformed
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Tree> {
        let path = path.as_ref();
        info!("Loading {} translations from {}", F::DEBUG_NAME, path.display());

        if !path.is_file() {
            return Err(TranslationError::NotFound(format!(
                "File does not exist at path '{}'",
                path.display()
            )));
        }

        let content = fs::read(path).map_err(|source| TranslationError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tree = F::parse(&content, &self.delimiters).map_err(|e| e.with_resource(path))?;
        let substituted = self.fill_missing_values(&mut tree, path);
        if substituted > 0 {
            debug!("Substituted {} missing values in {}", substituted, path.display());
        }

        info!("Loaded {} top-level entries from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Replaces empty leaves in place, returning how many were replaced.
    fn fill_missing_values(&self, tree: &mut Tree, path: &Path) -> usize {
        let mut count = 0;
        for (key, node) in tree.iter_mut() {
            match node {
                Node::Scalar(value) if value.is_empty() => {
                    *value = match &self.missing_value {
                        Some(handler) => handler(key, path),
                        None => key.clone(),
                    };
                    count += 1;
                }
                Node::Scalar(_) => {}
                Node::Mapping(child) => count += self.fill_missing_values(child, path),
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::types::filetypes::Yaml;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_handler_substitutes_the_key() {
        let file = yaml_file("greeting: ~\nnested:\n  farewell:\n");
        let tree = TranslationLoader::<Yaml>::new().load(file.path()).unwrap();
        assert_eq!(tree["greeting"].as_str(), Some("greeting"));
        assert_eq!(tree["nested"].as_mapping().unwrap()["farewell"].as_str(), Some("farewell"));
    }

    #[test]
    fn custom_handler_sees_key_and_path() {
        let file = yaml_file("greeting: \"\"\n");
        let expected = file.path().to_path_buf();
        let loader = TranslationLoader::<Yaml>::new().with_missing_value_handler(move |key, path| {
            assert_eq!(path, expected.as_path());
            format!("[{}]", key)
        });
        assert_eq!(loader.load(file.path()).unwrap()["greeting"].as_str(), Some("[greeting]"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let file = yaml_file("a: \"1\"\na: \"2\"\n");
        let error = TranslationLoader::<Yaml>::new().load(file.path()).unwrap_err();
        let message = error.to_string();
        assert!(matches!(error, TranslationError::InvalidResource(_)));
        assert!(message.contains(&file.path().display().to_string()), "{message}");
    }
}
