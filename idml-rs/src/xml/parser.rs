//! XML parser that builds element trees.
//!
//! This parser uses quick-xml's namespace-aware streaming reader. Element
//! namespaces are resolved to URIs; a prefix that is not bound anywhere is
//! kept as the namespace string instead of failing the parse.

use std::fs;
use std::path::Path;

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{require_input, Error, Result};
use crate::node::{is_xmlns_attr, Attribute, Element};

/// Parses byte streams into [`Element`] trees.
#[derive(Debug, Clone)]
pub struct TreeParser {
    context: String,
}

impl Default for TreeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParser {
    /// Creates a parser whose errors carry the context "parse document".
    pub fn new() -> Self {
        Self::with_context("parse document")
    }

    /// Creates a parser whose errors are wrapped with `context`.
    pub fn with_context(context: impl Into<String>) -> Self {
        TreeParser {
            context: context.into(),
        }
    }

    /// Parses optional input, rejecting nil and empty input first.
    pub fn parse(&self, input: Option<&[u8]>) -> Result<Element> {
        let bytes = require_input(input)?;
        self.parse_bytes(bytes)
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Element> {
        self.parse(Some(xml.as_bytes()))
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Element> {
        let bytes = fs::read(path)?;
        self.parse(Some(&bytes))
    }

    /// Parses XML bytes into a single root element.
    ///
    /// The declaration, processing instructions, comments and DOCTYPE are
    /// skipped. Anything other than whitespace, comments or PIs after the
    /// root element is an error.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Element> {
        let mut reader = new_reader(bytes);
        let mut buf = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            buf.clear();
            let (resolve, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| Error::parse(&self.context, e))?;
            let namespace = resolved_namespace(resolve);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if root.is_some() {
                        return Err(Error::parse(
                            &self.context,
                            "unexpected element after root element",
                        ));
                    }
                    let is_empty = matches!(event, Event::Empty(_));
                    let element = element_from_start(&reader, namespace, e, &self.context)?;
                    let tree =
                        read_subtree(&mut reader, element, is_empty, &self.context)?;
                    log::trace!("parsed root <{}> ({} nodes)", tree.tag(), tree.node_count());
                    root = Some(tree);
                }
                Event::End(_) => {
                    return Err(Error::parse(&self.context, "unmatched closing tag"));
                }
                Event::Text(ref e) => {
                    let text = e.decode().map_err(|e| Error::parse(&self.context, e))?;
                    if !text.trim().is_empty() {
                        return Err(Error::parse(
                            &self.context,
                            "text content outside of root element",
                        ));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or_else(|| Error::parse(&self.context, "no root element"))
    }
}

/// Creates a namespace-aware reader that keeps all whitespace.
pub(crate) fn new_reader(bytes: &[u8]) -> NsReader<&[u8]> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(false);
    reader
}

/// Converts quick-xml's resolution into the namespace string stored on
/// elements and attributes.
pub(crate) fn resolved_namespace(resolve: ResolveResult<'_>) -> String {
    match resolve {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
        ResolveResult::Unbound => String::new(),
        ResolveResult::Unknown(prefix) => String::from_utf8_lossy(&prefix).into_owned(),
    }
}

/// Builds an element (without children) from a start or empty tag.
pub(crate) fn element_from_start(
    reader: &NsReader<&[u8]>,
    namespace: String,
    start: &BytesStart<'_>,
    context: &str,
) -> Result<Element> {
    let tag = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|e| Error::parse(context, e))?
        .to_string();
    let mut element = Element::new(tag).with_namespace(namespace);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::parse(context, format!("attribute error: {}", e)))?;
        let key = attr.key;
        let raw_key = std::str::from_utf8(key.as_ref()).map_err(|e| Error::parse(context, e))?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| Error::parse(context, e))?
            .into_owned();

        if is_xmlns_attr(raw_key) {
            // The default declaration is reflected in element namespaces;
            // prefixed declarations are kept so that prefixes survive.
            if let Some(prefix) = raw_key.strip_prefix("xmlns:") {
                element.push_attribute(Attribute::namespace_declaration(prefix, value));
            }
            continue;
        }

        let (attr_resolve, local) = reader.resolver().resolve_attribute(key);
        let attr_namespace = resolved_namespace(attr_resolve);
        let local = std::str::from_utf8(local.as_ref()).map_err(|e| Error::parse(context, e))?;
        element.push_attribute(Attribute::with_namespace(attr_namespace, local, value));
    }

    Ok(element)
}

/// Reads events until `first` is closed and returns the finished subtree.
pub(crate) fn read_subtree(
    reader: &mut NsReader<&[u8]>,
    first: Element,
    is_empty: bool,
    context: &str,
) -> Result<Element> {
    if is_empty {
        return Ok(first);
    }

    let mut builder = TreeBuilder::new(first);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let (resolve, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| Error::parse(context, e))?;
        let namespace = resolved_namespace(resolve);

        match event {
            Event::Start(ref e) => {
                let element = element_from_start(reader, namespace, e, context)?;
                builder.open(element);
            }
            Event::Empty(ref e) => {
                let element = element_from_start(reader, namespace, e, context)?;
                builder.leaf(element);
            }
            Event::End(_) => {
                if let Some(done) = builder.close() {
                    return Ok(done);
                }
            }
            Event::Text(ref e) => {
                let text = e.decode().map_err(|e| Error::parse(context, e))?;
                builder.text(&text);
            }
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e.as_ref()).map_err(|e| Error::parse(context, e))?;
                builder.text(text);
            }
            Event::GeneralRef(ref e) => {
                let name = e.decode().map_err(|e| Error::parse(context, e))?;
                builder.text(&resolve_entity(&name, context)?);
            }
            Event::Eof => {
                return Err(Error::parse(context, "unexpected end of input"));
            }
            _ => {}
        }
    }
}

/// Resolves a general entity reference to its character value.
///
/// Handles the predefined entities and numeric references; any other
/// entity is kept literally.
fn resolve_entity(raw: &str, context: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => rest.parse::<u32>(),
        }
        .map_err(|_| Error::parse(context, format!("invalid character reference &{};", raw)))?;
        let ch = char::from_u32(code)
            .ok_or_else(|| Error::parse(context, format!("invalid code point {}", code)))?;
        return Ok(ch.to_string());
    }

    Ok(format!("&{};", raw))
}

/// Assembles a subtree from a linear stream of open/close events.
struct TreeBuilder {
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new(first: Element) -> Self {
        TreeBuilder { stack: vec![first] }
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn leaf(&mut self, element: Element) {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_child(element);
        }
    }

    /// Closes the innermost element; returns the root once it is closed.
    fn close(&mut self) -> Option<Element> {
        let done = self.stack.pop()?;
        match self.stack.last_mut() {
            Some(parent) => {
                parent.push_child(done);
                None
            }
            None => Some(done),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(current) = self.stack.last_mut() {
            current.push_text(text);
        }
    }
}

/// Parses XML from a string with the default parser.
pub fn parse_str(xml: &str) -> Result<Element> {
    TreeParser::new().parse_str(xml)
}

/// Parses optional bytes with the default parser.
pub fn parse_bytes(input: Option<&[u8]>) -> Result<Element> {
    TreeParser::new().parse(input)
}
