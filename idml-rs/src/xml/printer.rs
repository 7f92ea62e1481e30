//! XML printer that outputs element trees.
//!
//! This is the generic encoder used by the round-trip pipeline. It writes
//! empty elements as `<a></a>`; the self-closing form is produced
//! afterwards by [`compact_empty_elements`](crate::package::compact_empty_elements).

use std::io::Write;

use quick_xml::escape::{escape, partial_escape};

use crate::constants::{DEFAULT_INDENT, XMLNS_NAMESPACE};
use crate::error::{Error, Result};
use crate::node::{Element, NamespaceContext};
use crate::package::compact_empty_elements;

use super::parser::TreeParser;

/// Options for XML printing.
#[derive(Debug, Clone)]
pub struct XmlPrinterOptions {
    /// Whether to put each element on its own indented line.
    pub pretty_print: bool,
    /// Indentation unit for one nesting level.
    pub indent: String,
}

impl Default for XmlPrinterOptions {
    fn default() -> Self {
        XmlPrinterOptions {
            pretty_print: true,
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl XmlPrinterOptions {
    /// Options for single-line output.
    pub fn compact() -> Self {
        XmlPrinterOptions {
            pretty_print: false,
            ..Default::default()
        }
    }
}

/// XML printer that outputs element trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
    scopes: NamespaceContext,
    /// Counter for prefixes invented for attribute namespaces.
    generated: usize,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new XML printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter {
            writer,
            options,
            scopes: NamespaceContext::new(),
            generated: 0,
        }
    }

    /// Prints an element tree. No declaration is written.
    pub fn print(&mut self, root: &Element) -> std::io::Result<()> {
        self.print_element(root, 0)?;
        self.writer.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn print_element(&mut self, element: &Element, depth: usize) -> std::io::Result<()> {
        self.scopes.push_scope();
        for attr in element.attributes() {
            if attr.is_namespace_declaration() {
                self.scopes.bind(attr.name(), attr.value());
            }
        }

        let mut declarations = String::new();
        let qname = self.element_name(element, &mut declarations);
        let attributes = self.attribute_list(element, &mut declarations);

        self.write_indent(depth)?;
        write!(self.writer, "<{}{}{}>", qname, declarations, attributes)?;

        if element.children().is_empty() {
            write!(self.writer, "{}", partial_escape(element.text()))?;
        } else {
            let text = element.text().trim();
            if !text.is_empty() {
                self.newline()?;
                self.write_indent(depth + 1)?;
                write!(self.writer, "{}", partial_escape(text))?;
            }
            for child in element.children() {
                self.newline()?;
                self.print_element(child, depth + 1)?;
            }
            self.newline()?;
            self.write_indent(depth)?;
        }

        write!(self.writer, "</{}>", qname)?;
        self.scopes.pop_scope();
        Ok(())
    }

    /// Chooses the element's qualified name, emitting a default namespace
    /// declaration when no prefix is in scope for its namespace.
    fn element_name(&mut self, element: &Element, declarations: &mut String) -> String {
        let namespace = element.namespace();
        if namespace.is_empty() {
            if !self.scopes.default_namespace().is_empty() {
                declarations.push_str(" xmlns=\"\"");
                self.scopes.bind("", "");
            }
            return element.tag().to_string();
        }

        if let Some(prefix) = self.scopes.prefix_for(namespace) {
            return format!("{}:{}", prefix, element.tag());
        }
        if self.scopes.default_namespace() != namespace {
            declarations.push_str(&format!(" xmlns=\"{}\"", escape(namespace)));
            self.scopes.bind("", namespace);
        }
        element.tag().to_string()
    }

    fn attribute_list(&mut self, element: &Element, declarations: &mut String) -> String {
        let mut out = String::new();
        for attr in element.attributes() {
            let name = match attr.namespace() {
                "" => attr.name().to_string(),
                XMLNS_NAMESPACE => format!("xmlns:{}", attr.name()),
                namespace => {
                    let prefix = match self.scopes.prefix_for(namespace) {
                        Some(prefix) => prefix.to_string(),
                        None => self.generate_prefix(namespace, declarations),
                    };
                    format!("{}:{}", prefix, attr.name())
                }
            };
            out.push_str(&format!(" {}=\"{}\"", name, escape(attr.value())));
        }
        out
    }

    fn generate_prefix(&mut self, namespace: &str, declarations: &mut String) -> String {
        loop {
            self.generated += 1;
            let prefix = format!("ns{}", self.generated);
            if self.scopes.resolve(&prefix).is_none() {
                declarations.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape(namespace)));
                self.scopes.bind(&prefix, namespace);
                return prefix;
            }
        }
    }

    fn newline(&mut self) -> std::io::Result<()> {
        if self.options.pretty_print {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_indent(&mut self, depth: usize) -> std::io::Result<()> {
        if self.options.pretty_print {
            write!(self.writer, "{}", self.options.indent.repeat(depth))?;
        }
        Ok(())
    }
}

/// Prints an element tree to an indented string.
pub fn print_to_string(root: &Element) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions::default())
}

/// Prints an element tree to a single-line string.
pub fn print_to_string_compact(root: &Element) -> std::io::Result<String> {
    print_with_options(root, XmlPrinterOptions::compact())
}

fn print_with_options(root: &Element, options: XmlPrinterOptions) -> std::io::Result<String> {
    let mut output = Vec::new();
    {
        let mut printer = XmlPrinter::with_options(&mut output, options);
        printer.print(root)?;
    }
    String::from_utf8(output).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Re-serializes a document with canonical indentation.
///
/// The prolog is dropped, and empty elements come out self-closing.
pub fn normalize(input: Option<&[u8]>) -> Result<Vec<u8>> {
    let root = TreeParser::with_context("normalize").parse(input)?;
    let printed = print_to_string(&root).map_err(|e| Error::Encode(e.to_string()))?;
    log::debug!("normalized <{}> ({} nodes)", root.tag(), root.node_count());
    Ok(compact_empty_elements(&printed).into_bytes())
}
