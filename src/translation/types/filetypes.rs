//! Specialization logic for the supported translation file formats.

use super::error::Result;
use super::models::{Delimiters, DumpArguments, Tree};
use crate::translation::format::{json, mo, php, po, xliff, yaml};

/// A trait that defines the behavior of a specific translation file format.
///
/// Implementors are zero-sized markers; the generic
/// [`TranslationLoader`](crate::TranslationLoader) and
/// [`TranslationDumper`](crate::TranslationDumper) drive the shared
/// load/dump lifecycle around these two hooks.
pub trait FileFormat {
    /// A short name used for debugging and logging.
    const DEBUG_NAME: &'static str;

    /// Whether the format can store nested mappings.
    ///
    /// Flat formats reject nested trees during dump validation.
    const NESTED: bool;

    /// Parses raw file content into a tree.
    ///
    /// Absent values are returned as empty scalars; the loader applies the
    /// missing-value handler afterwards.
    fn parse(content: &[u8], delimiters: &Delimiters) -> Result<Tree>;

    /// Renders a validated tree into file content.
    fn format(translations: &Tree, delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>>;
}

/// Zero-cost marker struct for the YAML subset.
#[derive(Debug)]
pub struct Yaml;

impl FileFormat for Yaml {
    const DEBUG_NAME: &'static str = "YAML";
    const NESTED: bool = true;

    fn parse(content: &[u8], _delimiters: &Delimiters) -> Result<Tree> {
        yaml::parse(content)
    }

    fn format(translations: &Tree, _delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
        Ok(yaml::format(translations, arguments.anchors).into_bytes())
    }
}

/// Zero-cost marker struct for JSON objects.
#[derive(Debug)]
pub struct Json;

impl FileFormat for Json {
    const DEBUG_NAME: &'static str = "JSON";
    const NESTED: bool = true;

    fn parse(content: &[u8], _delimiters: &Delimiters) -> Result<Tree> {
        json::parse(content)
    }

    fn format(translations: &Tree, _delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
        json::format(translations, arguments.pretty)
    }
}

/// Zero-cost marker struct for PHP files returning an array literal.
#[derive(Debug)]
pub struct Php;

impl FileFormat for Php {
    const DEBUG_NAME: &'static str = "PHP";
    const NESTED: bool = true;

    fn parse(content: &[u8], _delimiters: &Delimiters) -> Result<Tree> {
        php::parse(content)
    }

    fn format(translations: &Tree, _delimiters: &Delimiters, _arguments: &DumpArguments) -> Result<Vec<u8>> {
        Ok(php::format(translations).into_bytes())
    }
}

/// Zero-cost marker struct for XLIFF 1.2 and 2.0 documents.
#[derive(Debug)]
pub struct Xliff;

impl FileFormat for Xliff {
    const DEBUG_NAME: &'static str = "XLIFF";
    const NESTED: bool = false;

    fn parse(content: &[u8], _delimiters: &Delimiters) -> Result<Tree> {
        xliff::parse(content)
    }

    fn format(translations: &Tree, _delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
        xliff::format(translations, arguments)
    }
}

/// Zero-cost marker struct for gettext PO catalogs.
#[derive(Debug)]
pub struct Po;

impl FileFormat for Po {
    const DEBUG_NAME: &'static str = "PO";
    const NESTED: bool = false;

    fn parse(content: &[u8], delimiters: &Delimiters) -> Result<Tree> {
        po::parse(content, delimiters)
    }

    fn format(translations: &Tree, delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
        Ok(po::format(translations, delimiters, arguments).into_bytes())
    }
}

/// Zero-cost marker struct for binary gettext MO catalogs.
#[derive(Debug)]
pub struct Mo;

impl FileFormat for Mo {
    const DEBUG_NAME: &'static str = "MO";
    const NESTED: bool = false;

    fn parse(content: &[u8], delimiters: &Delimiters) -> Result<Tree> {
        mo::parse(content, delimiters)
    }

    fn format(translations: &Tree, delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
        mo::format(translations, delimiters, arguments)
    }
}
