//! Extraction and re-injection of document metadata.
//!
//! A generic encoder drops the XML declaration and processing instructions
//! and knows nothing about the prefixes the source used. Extraction here is
//! pattern-based over the raw bytes and independent of the tokenizer, so
//! it works even on input the parser rejects.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::constants::{DEFAULT_DECLARATION, WRAPPED_ELEMENTS};
use crate::node::{split_qname, Metadata, ProcessingInstruction};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\?xml\s+(.*?)\s*\?>").expect("valid declaration regex")
});

/// A processing instruction (group 1 = target, group 2 = instruction), or
/// a comment or CDATA section to step over.
static PROCESSING_INSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<\?([A-Za-z_:][\w.:\-]*)(.*?)\?>")
        .expect("valid processing instruction regex")
});

/// Markup that can precede the root start tag, or the root tag itself
/// (group 1 = name, group 2 = attributes).
static PROLOG_OR_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<![^>]*>|<\?.*?\?>|<([A-Za-z_][\w.:\-]*)((?:\s+[^\s=<>/"']+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*/?>"#,
    )
    .expect("valid root tag regex")
});

static NAMESPACE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:([\w.\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid namespace declaration regex")
});

impl Metadata {
    /// Extracts the declaration, processing instructions and root-level
    /// namespace prefixes from raw input. Never fails; missing parts are
    /// left empty.
    pub fn extract(input: &[u8]) -> Metadata {
        let text = String::from_utf8_lossy(input);

        let declaration = DECLARATION
            .captures(&text)
            .map(|caps| caps[1].to_string());

        let processing_instructions: Vec<ProcessingInstruction> = PROCESSING_INSTRUCTION
            .captures_iter(&text)
            .filter(|caps| caps.get(1).is_some_and(|target| target.as_str() != "xml"))
            .map(|caps| {
                let instruction = caps[2].trim_start().trim_end_matches([' ', '\t']);
                ProcessingInstruction::new(&caps[1], instruction)
            })
            .collect();

        let mut namespaces = IndexMap::new();
        let root_attributes = PROLOG_OR_ROOT
            .captures_iter(&text)
            .find_map(|caps| caps.get(1).and(caps.get(2)));
        if let Some(attributes) = root_attributes {
            for caps in NAMESPACE_DECLARATION.captures_iter(attributes.as_str()) {
                let uri = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                namespaces.insert(caps[1].to_string(), uri.to_string());
            }
        }

        log::debug!(
            "extracted metadata: declaration={}, {} PI(s), {} namespace(s)",
            declaration.is_some(),
            processing_instructions.len(),
            namespaces.len()
        );

        Metadata {
            declaration,
            processing_instructions,
            namespaces,
        }
    }

    /// Renders the declaration and processing instructions, one per line.
    ///
    /// Without a preserved declaration the default
    /// `version="1.0" encoding="UTF-8" standalone="yes"` is used.
    pub fn prolog(&self) -> String {
        let declaration = self.declaration.as_deref().unwrap_or(DEFAULT_DECLARATION);
        let mut out = format!("<?xml {}?>\n", declaration);
        for pi in &self.processing_instructions {
            if pi.instruction.is_empty() {
                out.push_str(&format!("<?{}?>\n", pi.target));
            } else {
                out.push_str(&format!("<?{} {}?>\n", pi.target, pi.instruction));
            }
        }
        out
    }
}

/// Any tag-like markup in a serialized body. Comments, CDATA sections,
/// declarations and PIs leave group 2 empty; for element tags group 1 is
/// the closing slash, group 2 the name, group 3 the attributes and group 4
/// the trailing whitespace and self-closing slash.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<![^>]*>|<\?.*?\?>|<(/?)([A-Za-z_][\w.:\-]*)((?:\s+[^\s=<>/"']+\s*=\s*(?:"[^"]*"|'[^']*'))*)(\s*/?)>"#,
    )
    .expect("valid markup regex")
});

static DEFAULT_NAMESPACE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sxmlns\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid default namespace regex")
});

/// An element whose start tag has been seen but not its end tag.
struct OpenTag {
    /// Closing tag to write instead of the original one.
    closing: Option<String>,
    /// Default namespace in effect for the element's content.
    default_namespace: String,
    /// Rewritten start tag whose removed `xmlns="..."` is the default
    /// namespace in effect here.
    removed_default: Option<usize>,
}

/// A rewritten start tag, finished once it is known whether any
/// descendant still relies on the default declaration it dropped.
struct RewrittenTag {
    head: String,
    uri: String,
    rest: String,
    keep_default: bool,
}

enum Piece {
    Verbatim(String),
    Rewritten(usize),
}

/// Restores prefixed element names in generically encoded output.
///
/// For every preserved `prefix -> uri`, start tags written as
/// `<Name xmlns="uri"` become `<prefix:Name xmlns:prefix="uri"`. The end
/// tag paired with a rewritten start tag is repaired only for names in
/// [`WRAPPED_ELEMENTS`]; other rewritten elements keep their unprefixed
/// end tag. When an unprefixed descendant inherits the dropped default
/// namespace, `xmlns="uri"` stays on the rewritten tag so the descendant
/// keeps its namespace. Inside start tags, the `xmlns:_xmlns="xmlns"`
/// artifact some encoders produce for an attribute literally named
/// `xmlns:prefix` is removed and `_xmlns:` restored to `xmlns:`.
pub fn fix_namespace_prefixes(body: &str, namespaces: &IndexMap<String, String>) -> String {
    let mut pieces = Vec::new();
    let mut rewritten: Vec<RewrittenTag> = Vec::new();
    let mut open: Vec<OpenTag> = Vec::new();
    let mut last = 0;

    for caps in MARKUP.captures_iter(body) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        pieces.push(Piece::Verbatim(body[last..whole.start()].to_string()));
        last = whole.end();
        let name = name.as_str();
        let tail = &caps[4];

        if !caps[1].is_empty() {
            let closing = open.pop().and_then(|tag| tag.closing);
            pieces.push(Piece::Verbatim(
                closing.unwrap_or_else(|| whole.as_str().to_string()),
            ));
            continue;
        }

        let attributes = caps[3]
            .replace(r#" xmlns:_xmlns="xmlns""#, "")
            .replace(" _xmlns:", " xmlns:");
        let (inherited_namespace, inherited_removal) = open
            .last()
            .map_or((String::new(), None), |tag| {
                (tag.default_namespace.clone(), tag.removed_default)
            });
        let own_default = DEFAULT_NAMESPACE_ATTR.captures(&attributes).map(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .map_or(String::new(), |m| m.as_str().to_string())
        });

        let rewrite = match split_qname(name) {
            (None, local) => namespaces.iter().find_map(|(prefix, uri)| {
                attributes
                    .strip_prefix(&format!(r#" xmlns="{}""#, uri))
                    .map(|rest| (local, prefix, uri, rest.to_string()))
            }),
            (Some(_), _) => None,
        };

        let mut tag = OpenTag {
            closing: None,
            default_namespace: own_default.clone().unwrap_or(inherited_namespace),
            removed_default: if own_default.is_some() {
                None
            } else {
                inherited_removal
            },
        };

        match rewrite {
            Some((local, prefix, uri, rest)) => {
                let declaration = format!("xmlns:{}=", prefix);
                let head = if rest.contains(&declaration) {
                    format!("<{}:{}", prefix, local)
                } else {
                    format!(r#"<{}:{} xmlns:{}="{}""#, prefix, local, prefix, uri)
                };
                if WRAPPED_ELEMENTS.contains(&local) {
                    tag.closing = Some(format!("</{}:{}>", prefix, local));
                }
                tag.removed_default = Some(rewritten.len());
                pieces.push(Piece::Rewritten(rewritten.len()));
                rewritten.push(RewrittenTag {
                    head,
                    uri: uri.clone(),
                    rest: format!("{}{}>", rest, tail),
                    keep_default: false,
                });
            }
            None => {
                let unprefixed = split_qname(name).0.is_none();
                if unprefixed && own_default.is_none() {
                    if let Some(index) = inherited_removal {
                        rewritten[index].keep_default = true;
                    }
                }
                pieces.push(Piece::Verbatim(format!("<{}{}{}>", name, attributes, tail)));
            }
        }

        if !tail.ends_with('/') {
            open.push(tag);
        }
    }
    pieces.push(Piece::Verbatim(body[last..].to_string()));

    pieces
        .into_iter()
        .map(|piece| match piece {
            Piece::Verbatim(text) => text,
            Piece::Rewritten(index) => {
                let tag = &rewritten[index];
                if tag.keep_default {
                    format!(r#"{} xmlns="{}"{}"#, tag.head, tag.uri, tag.rest)
                } else {
                    format!("{}{}", tag.head, tag.rest)
                }
            }
        })
        .collect()
}
