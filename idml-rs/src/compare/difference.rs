//! Difference records produced by the comparator.

use std::fmt;

use crate::constants::{TEXT_TRUNCATE_LIMIT, TRUNCATION_MARKER};

/// Category of a structural difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceKind {
    /// Element local names differ.
    Tag,
    /// Element namespaces differ.
    Namespace,
    /// An attribute is missing, extra, or has another value.
    Attribute,
    /// Text content differs.
    Text,
    /// Child counts differ, or a root is missing.
    Structure,
}

impl DifferenceKind {
    /// Returns the lowercase label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::Tag => "tag",
            DifferenceKind::Namespace => "namespace",
            DifferenceKind::Attribute => "attribute",
            DifferenceKind::Text => "text",
            DifferenceKind::Structure => "structure",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single difference between the original and the generated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Slash-delimited location, e.g. `root/Color[2]`.
    pub path: String,
    /// Category of the difference.
    pub kind: DifferenceKind,
    /// Human-readable description.
    pub description: String,
    /// Value found in the original.
    pub expected: String,
    /// Value found in the generated document.
    pub actual: String,
}

impl Difference {
    /// Creates a difference record.
    pub fn new(
        path: impl Into<String>,
        kind: DifferenceKind,
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Difference {
            path: path.into(),
            kind,
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.path, self.kind)?;
        writeln!(f, "   {}", self.description)?;
        writeln!(f, "   Expected: {}", self.expected)?;
        write!(f, "   Got: {}", self.actual)
    }
}

/// Cuts `text` to the report limit, appending a marker when shortened.
pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(TEXT_TRUNCATE_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
