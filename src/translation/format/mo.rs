//! Binary gettext MO catalogs.
//!
//! Layout (all fields `u32` in the file's byte order):
//!
//! ```text
//! 0   magic 0x950412DE
//! 4   revision
//! 8   number of strings N
//! 12  offset of the originals table     (N × [length, offset])
//! 16  offset of the translations table  (N × [length, offset])
//! 20  hash table size
//! 24  hash table offset
//! ```
//!
//! Message context is joined to the original with `\x04`, plural forms
//! with `\x00`.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, trace};

use crate::translation::types::error::{Result, TranslationError};
use crate::translation::types::models::{Delimiters, DumpArguments, Node, Tree};
use crate::translation::utils::header_fields;

const MAGIC: u32 = 0x950412DE;
const HEADER_SIZE: usize = 28;
const CONTEXT_SEPARATOR: char = '\x04';
const PLURAL_SEPARATOR: char = '\x00';

/// Parses an MO catalog of either byte order.
pub fn parse(content: &[u8], delimiters: &Delimiters) -> Result<Tree> {
    if content.len() < HEADER_SIZE {
        return Err(invalid("the header is truncated"));
    }

    if LittleEndian::read_u32(content) == MAGIC {
        debug!("MO catalog is little-endian");
        read_catalog::<LittleEndian>(content, delimiters)
    } else if BigEndian::read_u32(content) == MAGIC {
        debug!("MO catalog is big-endian");
        read_catalog::<BigEndian>(content, delimiters)
    } else {
        Err(invalid("the magic number is wrong"))
    }
}

fn invalid(problem: &str) -> TranslationError {
    TranslationError::InvalidResource(format!("The MO catalog is invalid: {}", problem))
}

fn read_catalog<B: ByteOrder>(content: &[u8], delimiters: &Delimiters) -> Result<Tree> {
    let field = |index: usize| B::read_u32(&content[index * 4..]) as usize;
    let count = field(2);
    let originals_offset = field(3);
    let translations_offset = field(4);

    let originals = string_table(content, originals_offset, count)?;
    let translations = string_table(content, translations_offset, count)?;

    let mut tree = Tree::new();
    for index in 0..count {
        let original = string_at::<B>(content, originals, index)?;
        let translation = string_at::<B>(content, translations, index)?;
        if original.is_empty() || translation.is_empty() {
            continue;
        }

        let original = std::str::from_utf8(original).map_err(|_| invalid("an original is not UTF-8"))?;
        let translation = std::str::from_utf8(translation).map_err(|_| invalid("a translation is not UTF-8"))?;

        let key = join_plurals(&join_context(original, delimiters), delimiters);
        let value = join_plurals(translation, delimiters);
        trace!("MO entry '{}'", key);
        tree.insert(key, Node::Scalar(value));
    }

    Ok(tree)
}

/// The `count` descriptors of a string table starting at `offset`.
fn string_table(content: &[u8], offset: usize, count: usize) -> Result<&[u8]> {
    count
        .checked_mul(8)
        .and_then(|size| content.get(offset..offset.checked_add(size)?))
        .ok_or_else(|| invalid("a string table lies outside the file"))
}

fn string_at<'c, B: ByteOrder>(content: &'c [u8], table: &[u8], index: usize) -> Result<&'c [u8]> {
    let length = B::read_u32(&table[index * 8..]) as usize;
    let offset = B::read_u32(&table[index * 8 + 4..]) as usize;
    offset
        .checked_add(length)
        .and_then(|end| content.get(offset..end))
        .ok_or_else(|| invalid("a string lies outside the file"))
}

fn join_context(original: &str, delimiters: &Delimiters) -> String {
    match &delimiters.context {
        Some(delimiter) => original.replace(CONTEXT_SEPARATOR, delimiter),
        None => original
            .rsplit(CONTEXT_SEPARATOR)
            .next()
            .unwrap_or(original)
            .to_string(),
    }
}

fn join_plurals(text: &str, delimiters: &Delimiters) -> String {
    match &delimiters.plural {
        Some(delimiter) => text.replace(PLURAL_SEPARATOR, delimiter),
        None => text.split(PLURAL_SEPARATOR).next().unwrap_or(text).to_string(),
    }
}

/// Builds a little-endian MO catalog with a metadata header entry.
pub fn format(translations: &Tree, delimiters: &Delimiters, arguments: &DumpArguments) -> Result<Vec<u8>> {
    let header: String = header_fields(arguments)
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect();

    let mut entries: Vec<(String, String)> = vec![(String::new(), header)];
    for (key, node) in translations {
        let value = node.as_str().ok_or_else(|| {
            TranslationError::InvalidTranslations(format!("MO catalogs cannot hold the nested mapping '{}'", key))
        })?;
        entries.push(split_entry(key, value, delimiters));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    debug!("Writing MO catalog with {} strings", entries.len());

    let count = entries.len();
    let originals_table = HEADER_SIZE + count * 8;
    let pools_start = HEADER_SIZE + count * 16;
    let originals_size: usize = entries.iter().map(|(original, _)| original.len() + 1).sum();

    let overflow = || TranslationError::InvalidTranslations("The MO catalog exceeds 4 GiB".to_string());
    let to_u32 = |value: usize| u32::try_from(value).map_err(|_| overflow());

    let mut output = Vec::new();
    let mut write = |value: usize| -> Result<()> {
        output
            .write_u32::<LittleEndian>(to_u32(value)?)
            .map_err(|e| TranslationError::InvalidTranslations(format!("Failed to encode the MO catalog: {}", e)))
    };

    write(MAGIC as usize)?;
    write(0)?;
    write(count)?;
    write(HEADER_SIZE)?;
    write(originals_table)?;
    write(0)?;
    write(pools_start)?;

    let mut offset = pools_start;
    for (original, _) in &entries {
        write(original.len())?;
        write(offset)?;
        offset += original.len() + 1;
    }
    let mut offset = pools_start + originals_size;
    for (_, translation) in &entries {
        write(translation.len())?;
        write(offset)?;
        offset += translation.len() + 1;
    }

    for text in entries.iter().map(|(original, _)| original).chain(entries.iter().map(|(_, translation)| translation)) {
        output.extend_from_slice(text.as_bytes());
        output.push(0);
    }

    Ok(output)
}

/// Converts a dictionary entry to its MO original and translation.
fn split_entry(key: &str, value: &str, delimiters: &Delimiters) -> (String, String) {
    let mut original = match &delimiters.context {
        Some(delimiter) => key.replacen(delimiter.as_str(), &CONTEXT_SEPARATOR.to_string(), 1),
        None => key.to_string(),
    };
    let mut translation = value.to_string();

    if let Some(delimiter) = &delimiters.plural {
        original = original.replace(delimiter.as_str(), &PLURAL_SEPARATOR.to_string());
        translation = translation.replace(delimiter.as_str(), &PLURAL_SEPARATOR.to_string());
    }

    (original, translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Tree {
        let mut tree = Tree::new();
        tree.insert("hello".into(), "bonjour".into());
        tree.insert("menu::Open".into(), "Ouvrir".into());
        tree.insert("file|files".into(), "fichier|fichiers".into());
        tree
    }

    #[test]
    fn round_trips_context_and_plurals() {
        let delimiters = Delimiters::default();
        let bytes = format(&catalog(), &delimiters, &DumpArguments::default()).unwrap();
        assert_eq!(LittleEndian::read_u32(&bytes), MAGIC);
        assert_eq!(parse(&bytes, &delimiters).unwrap(), catalog());
    }

    #[test]
    fn missing_delimiters_drop_context_and_extra_forms() {
        let bytes = format(&catalog(), &Delimiters::default(), &DumpArguments::default()).unwrap();
        let tree = parse(&bytes, &Delimiters::new(None, None)).unwrap();
        assert_eq!(tree["Open"].as_str(), Some("Ouvrir"));
        assert_eq!(tree["file"].as_str(), Some("fichier"));
    }

    #[test]
    fn header_entry_is_sorted_first_and_skipped_on_load() {
        let arguments = DumpArguments::default().with_language("de");
        let bytes = format(&catalog(), &Delimiters::default(), &arguments).unwrap();
        let first_length = LittleEndian::read_u32(&bytes[28..]) as usize;
        assert_eq!(first_length, 0);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Language: de\nPlural-Forms: nplurals=2; plural=(n != 1);\n"));
        assert!(!parse(&bytes, &Delimiters::default()).unwrap().contains_key(""));
    }

    #[test]
    fn reads_big_endian_catalogs() {
        let mut bytes = Vec::new();
        for field in [MAGIC, 0, 1, 28, 36, 0, 44] {
            bytes.write_u32::<BigEndian>(field).unwrap();
        }
        for field in [2u32, 44, 2, 47] {
            bytes.write_u32::<BigEndian>(field).unwrap();
        }
        bytes.extend_from_slice(b"hi\0yo\0");

        let tree = parse(&bytes, &Delimiters::default()).unwrap();
        assert_eq!(tree["hi"].as_str(), Some("yo"));
    }

    #[test]
    fn rejects_malformed_catalogs() {
        let delimiters = Delimiters::default();
        assert!(matches!(parse(&[0; 10], &delimiters), Err(TranslationError::InvalidResource(_))));
        assert!(matches!(parse(&[0; 28], &delimiters), Err(TranslationError::InvalidResource(_))));

        let mut bytes = Vec::new();
        for field in [MAGIC, 0, 5, 28, 1000, 0, 0] {
            bytes.write_u32::<LittleEndian>(field).unwrap();
        }
        assert!(matches!(parse(&bytes, &delimiters), Err(TranslationError::InvalidResource(_))));
    }
}
