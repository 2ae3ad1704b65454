//! XLIFF 1.2 (`<trans-unit>`) and 2.0 (`<unit><segment>`) documents.

use log::{debug, trace};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::translation::types::error::{Result, TranslationError};
use crate::translation::types::models::{DumpArguments, Node, Tree};

const NAMESPACE_2_0: &str = "urn:oasis:names:tc:xliff:document:2.0";
const NAMESPACE_1_2: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// The part of a unit whose text is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Source,
    Target,
}

#[derive(Default)]
struct Unit {
    source: String,
    target: String,
    capture: Option<Capture>,
}

impl Unit {
    fn push_text(&mut self, text: &str) {
        match self.capture {
            Some(Capture::Source) => self.source.push_str(text),
            Some(Capture::Target) => self.target.push_str(text),
            None => {}
        }
    }
}

fn parsing_error(e: impl std::fmt::Display) -> TranslationError {
    TranslationError::Parsing(format!("Failed to parse XLIFF: {}", e))
}

fn write_error(e: impl std::fmt::Display) -> TranslationError {
    TranslationError::InvalidTranslations(format!("Failed to write XLIFF: {}", e))
}

/// Collects source/target pairs of both XLIFF generations.
pub fn parse(content: &[u8]) -> Result<Tree> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    let mut tree = Tree::new();
    let mut unit: Option<Unit> = None;
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(parsing_error)? {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                match e.local_name().as_ref() {
                    b"trans-unit" | b"segment" => unit = Some(Unit::default()),
                    b"source" => {
                        if let Some(unit) = unit.as_mut() {
                            unit.capture = Some(Capture::Source);
                        }
                    }
                    b"target" => {
                        if let Some(unit) = unit.as_mut() {
                            unit.capture = Some(Capture::Target);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(_) => seen_root = true,
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"trans-unit" | b"segment" => {
                        if let Some(finished) = unit.take() {
                            if finished.source.is_empty() {
                                trace!("Skipping XLIFF unit without a source");
                            } else {
                                tree.insert(finished.source, Node::Scalar(finished.target));
                            }
                        }
                    }
                    b"source" | b"target" => {
                        if let Some(unit) = unit.as_mut() {
                            unit.capture = None;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if let Some(unit) = unit.as_mut() {
                    unit.push_text(&e.unescape().map_err(parsing_error)?);
                }
            }
            Event::CData(e) => {
                if let Some(unit) = unit.as_mut() {
                    let raw = e.into_inner();
                    unit.push_text(std::str::from_utf8(&raw).map_err(parsing_error)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(parsing_error("the document has no root element"));
    }
    if depth != 0 {
        return Err(parsing_error("the document ends inside an element"));
    }

    debug!("Read {} XLIFF units", tree.len());
    Ok(tree)
}

/// Writes an XLIFF 2.0 document, or 1.2 when `arguments.legacy` is set.
pub fn format(translations: &Tree, arguments: &DumpArguments) -> Result<Vec<u8>> {
    let source_locale = arguments.source_locale.replace('_', "-");
    let target_locale = arguments.target_locale.replace('_', "-");

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_error)?;

    let mut xliff = BytesStart::new("xliff");
    if arguments.legacy {
        xliff.push_attribute(("xmlns", NAMESPACE_1_2));
        xliff.push_attribute(("version", "1.2"));
    } else {
        xliff.push_attribute(("xmlns", NAMESPACE_2_0));
        xliff.push_attribute(("version", "2.0"));
        xliff.push_attribute(("srcLang", source_locale.as_str()));
        xliff.push_attribute(("trgLang", target_locale.as_str()));
    }
    writer.write_event(Event::Start(xliff)).map_err(write_error)?;

    let mut file = BytesStart::new("file");
    if arguments.legacy {
        file.push_attribute(("source-language", source_locale.as_str()));
        file.push_attribute(("target-language", target_locale.as_str()));
        file.push_attribute(("datatype", "plaintext"));
        file.push_attribute(("original", "file.ext"));
    } else {
        file.push_attribute(("id", arguments.file_id.as_str()));
    }
    writer.write_event(Event::Start(file)).map_err(write_error)?;
    if arguments.legacy {
        writer
            .write_event(Event::Start(BytesStart::new("body")))
            .map_err(write_error)?;
    }

    for (index, (source, node)) in translations.iter().enumerate() {
        let target = node.as_str().ok_or_else(|| {
            TranslationError::InvalidTranslations(format!("XLIFF cannot hold the nested mapping '{}'", source))
        })?;
        let id = (index + 1).to_string();

        let (unit_name, segment) = if arguments.legacy {
            ("trans-unit", false)
        } else {
            ("unit", true)
        };
        let mut unit = BytesStart::new(unit_name);
        unit.push_attribute(("id", id.as_str()));
        writer.write_event(Event::Start(unit)).map_err(write_error)?;
        if segment {
            writer
                .write_event(Event::Start(BytesStart::new("segment")))
                .map_err(write_error)?;
        }

        for (name, text) in [("source", source.as_str()), ("target", target)] {
            writer.write_event(Event::Start(BytesStart::new(name))).map_err(write_error)?;
            writer.write_event(Event::Text(BytesText::new(text))).map_err(write_error)?;
            writer.write_event(Event::End(BytesEnd::new(name))).map_err(write_error)?;
        }

        if segment {
            writer
                .write_event(Event::End(BytesEnd::new("segment")))
                .map_err(write_error)?;
        }
        writer.write_event(Event::End(BytesEnd::new(unit_name))).map_err(write_error)?;
    }

    if arguments.legacy {
        writer
            .write_event(Event::End(BytesEnd::new("body")))
            .map_err(write_error)?;
    }
    writer.write_event(Event::End(BytesEnd::new("file"))).map_err(write_error)?;
    writer.write_event(Event::End(BytesEnd::new("xliff"))).map_err(write_error)?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    Ok(output)
}
