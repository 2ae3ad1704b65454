//! Codec layer for the text transformations shared between formats.
//!
//! # Submodules
//!
//! - [`escape`][]: C-style escaping used by YAML and PO
//! - [`plural`][]: gettext `Plural-Forms` rules per language

pub mod escape;
pub mod plural;
