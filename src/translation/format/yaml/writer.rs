//! Text rendering of a planned tree, followed by the anchor cleanup pass.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::planner::{AnchorPlan, fingerprint};
use super::scanner::{self, Link};
use crate::translation::codec::escape::quote;
use crate::translation::types::models::{Node, Tree};

const INDENT: &str = "  ";

pub struct Writer<'p, 't> {
    plan: &'p AnchorPlan<'t>,
    /// Anchors whose mapping has been written out completely.
    emitted: HashSet<usize>,
    output: String,
}

impl<'p, 't> Writer<'p, 't> {
    pub fn new(plan: &'p AnchorPlan<'t>) -> Self {
        Self {
            plan,
            emitted: HashSet::new(),
            output: String::new(),
        }
    }

    /// Renders the whole document, including the `---` and `...` markers.
    pub fn render(mut self, translations: &Tree) -> String {
        self.output.push_str("---\n");
        self.write_mapping(translations, 0);
        self.output.push_str("...\n");
        self.output
    }

    fn write_mapping(&mut self, tree: &Tree, depth: usize) {
        let plan = self.plan;
        let indent = INDENT.repeat(depth);

        for (key, node) in tree {
            let key = quote(key);
            let mapping = match node {
                Node::Scalar(value) => {
                    self.output.push_str(&format!("{}{}: {}\n", indent, key, quote(value)));
                    continue;
                }
                Node::Mapping(mapping) => mapping,
            };

            let fp = fingerprint(mapping);
            let anchor = plan.anchor_for(mapping, fp);

            match anchor {
                Some(id) if self.emitted.contains(&id) => {
                    self.output.push_str(&format!("{}{}: *{}\n", indent, key, id));
                    continue;
                }
                Some(id) => self.output.push_str(&format!("{}{}: &{}\n", indent, key, id)),
                None => self.output.push_str(&format!("{}{}:\n", indent, key)),
            }

            let merge = plan
                .merge_for(mapping, fp)
                .filter(|merge| self.emitted.contains(&merge.anchor));
            match merge {
                Some(merge) => {
                    trace!("Writing {} as a merge of anchor {}", key, merge.anchor);
                    self.output
                        .push_str(&format!("{}{}<<: *{}\n", indent, INDENT, merge.anchor));
                    self.write_mapping(&merge.diff, depth + 1);
                }
                None => self.write_mapping(mapping, depth + 1),
            }

            if let Some(id) = anchor {
                self.emitted.insert(id);
            }
        }
    }
}

/// Drops anchors that no alias refers to and renames the others to
/// `anchor_1`, `anchor_2`, ... in planning order.
pub fn cleanup(rendered: &str, plan: &AnchorPlan<'_>) -> String {
    let referenced: HashSet<&str> = rendered
        .lines()
        .filter_map(scanner::scan_line)
        .filter_map(|entry| match entry.link {
            Some(Link::Alias(name)) => Some(name),
            _ => None,
        })
        .collect();

    let mut renames: HashMap<String, Option<String>> = HashMap::new();
    let mut surviving = 0;
    for id in plan.anchor_ids() {
        let id = id.to_string();
        let rename = if referenced.contains(id.as_str()) {
            surviving += 1;
            Some(format!("anchor_{}", surviving))
        } else {
            None
        };
        renames.insert(id, rename);
    }
    debug!("Keeping {} of {} planned YAML anchors", surviving, renames.len());

    let mut output = String::with_capacity(rendered.len());
    for line in rendered.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let relinked = scanner::scan_line(body).and_then(|entry| {
            let (sigil, name) = match entry.link? {
                Link::Anchor(name) => ('&', name),
                Link::Alias(name) => ('*', name),
            };
            let span = entry.link_span?;
            let rename = renames.get(name)?;
            Some(match rename {
                Some(new_name) => format!("{}{}{}{}", &body[..span.start], sigil, new_name, &body[span.end..]),
                None => format!("{}{}", body[..span.start].trim_end_matches([' ', '\t']), &body[span.end..]),
            })
        });

        match relinked {
            Some(relinked) => {
                output.push_str(&relinked);
                output.push_str(&line[body.len()..]);
            }
            None => output.push_str(line),
        }
    }
    output
}
