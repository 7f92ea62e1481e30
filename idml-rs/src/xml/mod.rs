//! XML parsing and output.
//!
//! The parser builds owned [`Element`](crate::node::Element) trees from a
//! byte stream; the printer is the generic indenting encoder used both by
//! the normalizer and by the round-trip pipeline.

pub(crate) mod parser;
mod printer;

pub use parser::{parse_bytes, parse_str, TreeParser};
pub use printer::{
    normalize, print_to_string, print_to_string_compact, XmlPrinter, XmlPrinterOptions,
};
