//! IDML XML - structural comparison and round-trip serialization
//!
//! This library reads the XML resources of an Adobe InDesign Markup
//! Language package (Graphic.xml, Styles.xml, Spreads, Stories, ...),
//! writes them back without losing the prolog or the `idPkg:` wrapper
//! prefix, and checks that what was written is structurally equivalent to
//! what was read.
//!
//! # Overview
//!
//! - [`xml`]: a namespace-aware tree parser and an indenting printer.
//! - [`package`]: the round-trip pipeline. Metadata preservation, the
//!   `idPkg:` wrapper codec and empty-element compaction.
//! - [`compare`]: a structural comparator producing a capped, path-addressed
//!   list of differences and a plain-text report.
//!
//! # Example
//!
//! ```
//! use xml_idml::{compare_bytes, decode_document, encode_document, CompareOptions};
//!
//! let original: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <idPkg:Graphic xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="20.4">
//!   <Color Self="Color/Black" Name="Black" />
//! </idPkg:Graphic>"#;
//!
//! let document = decode_document(Some(original)).unwrap();
//! let generated = encode_document(&document).unwrap();
//!
//! let diffs = compare_bytes(Some(original), Some(&generated), &CompareOptions::default()).unwrap();
//! assert!(diffs.is_empty());
//! ```

pub mod compare;
pub mod constants;
pub mod error;
pub mod node;
pub mod package;
pub mod xml;

// Re-export commonly used types
pub use compare::{
    compare, compare_bytes, format_differences, Comparator, CompareOptions, Difference,
    DifferenceKind,
};
pub use error::{Error, Result};
pub use node::{Attribute, CatchAll, Document, Element, Metadata, UnknownElement};
pub use package::{
    compact_empty_elements, decode_document, encode, encode_document, unwrap_element,
    FromElement, ToElement, Unwrapped, Wrapper,
};
pub use xml::{normalize, parse_str, TreeParser, XmlPrinter, XmlPrinterOptions};
