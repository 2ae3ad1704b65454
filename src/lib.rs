//! # trans-files
//!
//! Loaders and dumpers for translation dictionaries: a YAML subset with
//! anchors, aliases and merge keys, JSON, PHP arrays, XLIFF and gettext
//! PO/MO catalogs.
//!
//! ```no_run
//! use trans_files::{DumpArguments, Json, TranslationDumper, TranslationLoader, Yaml};
//!
//! let tree = TranslationLoader::<Yaml>::new().load("lang/fr.yaml")?;
//! TranslationDumper::<Json>::new().dump(&tree, "lang/fr.json", &DumpArguments::default())?;
//! # Ok::<(), trans_files::TranslationError>(())
//! ```
pub mod translation;

// Re-export the main types for convenience
pub use translation::{
    FormatKind,
    TranslationDumper,
    TranslationError,
    TranslationLoader,
    convert,
    types::{
        filetypes::{FileFormat, Json, Mo, Php, Po, Xliff, Yaml},
        models::{Delimiters, DumpArguments, MissingValueHandler, Node, Tree},
    },
};
