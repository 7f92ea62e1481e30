//! Structural comparison of XML trees.
//!
//! Two documents are equivalent when tag, namespace, attribute set, text
//! (optionally trimmed) and children are recursively equal. Attribute
//! order never matters; child order only matters outside the configured
//! order-insensitive tags.

mod comparator;
mod difference;
mod options;
mod report;

pub use comparator::{compare, compare_bytes, Comparator};
pub use difference::{truncate_text, Difference, DifferenceKind};
pub use options::CompareOptions;
pub use report::format_differences;
