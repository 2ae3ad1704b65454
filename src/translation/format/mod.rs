//! Format layer: per-format parsers and renderers, plus run-time dispatch.
//!
//! # Submodules
//!
//! - [`yaml`][]: YAML subset with anchors, aliases and merge keys
//! - [`json`][]: JSON objects
//! - [`php`][]: PHP array literals
//! - [`xliff`][]: XLIFF 1.2 and 2.0
//! - [`po`][]: gettext PO catalogs
//! - [`mo`][]: gettext MO catalogs

pub mod json;
pub mod mo;
pub mod php;
pub mod po;
pub mod xliff;
pub mod yaml;

use std::fmt;
use std::path::Path;

use log::info;

use super::dumper::TranslationDumper;
use super::loader::TranslationLoader;
use super::types::error::{Result, TranslationError};
use super::types::filetypes::{FileFormat, Json, Mo, Php, Po, Xliff, Yaml};
use super::types::models::{Delimiters, DumpArguments, Tree};

/// A supported format, chosen at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Yaml,
    Json,
    Php,
    Xliff,
    Po,
    Mo,
}

impl FormatKind {
    pub const ALL: [FormatKind; 6] = [
        FormatKind::Yaml,
        FormatKind::Json,
        FormatKind::Php,
        FormatKind::Xliff,
        FormatKind::Po,
        FormatKind::Mo,
    ];

    /// Maps a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(FormatKind::Yaml),
            "json" => Some(FormatKind::Json),
            "php" => Some(FormatKind::Php),
            "xlf" | "xliff" => Some(FormatKind::Xliff),
            "po" | "pot" => Some(FormatKind::Po),
            "mo" => Some(FormatKind::Mo),
            _ => None,
        }
    }

    /// Picks the format from the extension of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                TranslationError::InvalidResource(format!(
                    "Cannot infer a translation format from the extension of '{}'",
                    path.display()
                ))
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Yaml => Yaml::DEBUG_NAME,
            FormatKind::Json => Json::DEBUG_NAME,
            FormatKind::Php => Php::DEBUG_NAME,
            FormatKind::Xliff => Xliff::DEBUG_NAME,
            FormatKind::Po => Po::DEBUG_NAME,
            FormatKind::Mo => Mo::DEBUG_NAME,
        }
    }

    /// Whether the format stores nested mappings.
    pub fn is_nested(self) -> bool {
        match self {
            FormatKind::Yaml => Yaml::NESTED,
            FormatKind::Json => Json::NESTED,
            FormatKind::Php => Php::NESTED,
            FormatKind::Xliff => Xliff::NESTED,
            FormatKind::Po => Po::NESTED,
            FormatKind::Mo => Mo::NESTED,
        }
    }

    /// Loads `path` with the default missing-value handler.
    pub fn load(self, path: impl AsRef<Path>, delimiters: &Delimiters) -> Result<Tree> {
        fn load_as<F: FileFormat>(path: &Path, delimiters: &Delimiters) -> Result<Tree> {
            TranslationLoader::<F>::new()
                .with_delimiters(delimiters.clone())
                .load(path)
        }

        let path = path.as_ref();
        match self {
            FormatKind::Yaml => load_as::<Yaml>(path, delimiters),
            FormatKind::Json => load_as::<Json>(path, delimiters),
            FormatKind::Php => load_as::<Php>(path, delimiters),
            FormatKind::Xliff => load_as::<Xliff>(path, delimiters),
            FormatKind::Po => load_as::<Po>(path, delimiters),
            FormatKind::Mo => load_as::<Mo>(path, delimiters),
        }
    }

    pub fn dump(self, translations: &Tree, path: impl AsRef<Path>, delimiters: &Delimiters, arguments: &DumpArguments) -> Result<()> {
        fn dump_as<F: FileFormat>(
            translations: &Tree,
            path: &Path,
            delimiters: &Delimiters,
            arguments: &DumpArguments,
        ) -> Result<()> {
            TranslationDumper::<F>::new()
                .with_delimiters(delimiters.clone())
                .dump(translations, path, arguments)
                .map(|_| ())
        }

        let path = path.as_ref();
        match self {
            FormatKind::Yaml => dump_as::<Yaml>(translations, path, delimiters, arguments),
            FormatKind::Json => dump_as::<Json>(translations, path, delimiters, arguments),
            FormatKind::Php => dump_as::<Php>(translations, path, delimiters, arguments),
            FormatKind::Xliff => dump_as::<Xliff>(translations, path, delimiters, arguments),
            FormatKind::Po => dump_as::<Po>(translations, path, delimiters, arguments),
            FormatKind::Mo => dump_as::<Mo>(translations, path, delimiters, arguments),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loads `input` and writes it to `output`, both formats picked by extension.
///
/// Returns the converted tree.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    delimiters: &Delimiters,
    arguments: &DumpArguments,
) -> Result<Tree> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let source = FormatKind::from_path(input)?;
    let target = FormatKind::from_path(output)?;
    info!("Converting {} ({}) to {} ({})", input.display(), source, output.display(), target);

    let translations = source.load(input, delimiters)?;
    target.dump(&translations, output, delimiters, arguments)?;
    Ok(translations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_formats_from_extensions() {
        assert_eq!(FormatKind::from_path("a/b/messages.YML").unwrap(), FormatKind::Yaml);
        assert_eq!(FormatKind::from_path("messages.xlf").unwrap(), FormatKind::Xliff);
        assert_eq!(FormatKind::from_path("messages.mo").unwrap(), FormatKind::Mo);
        assert!(matches!(
            FormatKind::from_path("messages.txt"),
            Err(TranslationError::InvalidResource(_))
        ));
        assert!(FormatKind::from_path("Makefile").is_err());
    }

    #[test]
    fn only_tree_formats_nest() {
        let nested: Vec<_> = FormatKind::ALL.into_iter().filter(|kind| kind.is_nested()).collect();
        assert_eq!(nested, [FormatKind::Yaml, FormatKind::Json, FormatKind::Php]);
    }
}
