//! Low-level helpers shared by several formats

use encoding_rs::{Encoding, UTF_8};
use indexmap::IndexMap;
use log::debug;

use super::codec::plural::plural_forms;
use super::types::error::{Result, TranslationError};
use super::types::models::DumpArguments;

/// Decode text content, honoring a byte-order mark if present.
///
/// A UTF-8 BOM is stripped, UTF-16 content with a BOM is transcoded.
/// Anything else must already be valid UTF-8.
pub fn decode_text(content: &[u8], format_name: &str) -> Result<String> {
    let invalid = || TranslationError::InvalidResource(format!("{} content must be UTF-8 encoded", format_name));

    match Encoding::for_bom(content) {
        Some((encoding, bom_len)) if encoding != UTF_8 => {
            debug!("{} content starts with a {} BOM", format_name, encoding.name());
            encoding
                .decode_without_bom_handling_and_without_replacement(&content[bom_len..])
                .map(|text| text.into_owned())
                .ok_or_else(invalid)
        }
        Some((_, bom_len)) => std::str::from_utf8(&content[bom_len..])
            .map(str::to_string)
            .map_err(|_| invalid()),
        None => std::str::from_utf8(content).map(str::to_string).map_err(|_| invalid()),
    }
}

/// Replace CRLF and lone CR line endings with LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Build the gettext header fields for PO and MO catalogs.
///
/// The MIME defaults always come first and cannot be overridden; user
/// metadata follows in insertion order, then `Language` and `Plural-Forms`
/// when a language was given and the caller did not set them.
pub fn header_fields(arguments: &DumpArguments) -> IndexMap<String, String> {
    let mut fields: IndexMap<String, String> = [
        ("MIME-Version", "1.0"),
        ("Content-Type", "text/plain; charset=UTF-8"),
        ("Content-Transfer-Encoding", "8bit"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in &arguments.metadata {
        fields.entry(key.clone()).or_insert_with(|| value.clone());
    }

    if let Some(language) = &arguments.language {
        fields
            .entry("Language".to_string())
            .or_insert_with(|| language.clone());
        fields
            .entry("Plural-Forms".to_string())
            .or_insert_with(|| plural_forms(language).to_string());
    }

    fields
}
