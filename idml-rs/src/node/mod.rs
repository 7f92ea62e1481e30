//! Node structures for XML tree representation.
//!
//! An IDML part is held as an owned tree of [`Element`]s. Namespaces are
//! stored resolved to URIs; prefixed declarations stay on their element as
//! attributes so prefixes survive a round trip.

mod document;
mod element;
mod namespace;
mod unknown;

pub use document::{Document, Metadata, ProcessingInstruction};
pub use element::{Attribute, Element};
pub use namespace::{is_xmlns_attr, split_qname, NamespaceContext};
pub use unknown::{CatchAll, UnknownElement};
