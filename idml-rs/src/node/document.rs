//! Documents: a root element plus the metadata a generic encoder drops.

use indexmap::IndexMap;

use super::Element;

/// A processing instruction other than the XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    /// The PI target, e.g. `aid`.
    pub target: String,
    /// Everything after the target, with trailing spaces and tabs removed.
    pub instruction: String,
}

impl ProcessingInstruction {
    /// Creates a processing instruction.
    pub fn new(target: impl Into<String>, instruction: impl Into<String>) -> Self {
        ProcessingInstruction {
            target: target.into(),
            instruction: instruction.into(),
        }
    }
}

/// Prolog and namespace information preserved across a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Raw attribute text of the `<?xml ...?>` declaration, if present.
    pub declaration: Option<String>,
    /// Processing instructions in document order.
    pub processing_instructions: Vec<ProcessingInstruction>,
    /// `xmlns:prefix` declarations found on the root element, in order.
    pub namespaces: IndexMap<String, String>,
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
    metadata: Metadata,
}

impl Document {
    /// Creates a document from its parts.
    pub fn new(root: Element, metadata: Metadata) -> Self {
        Document { root, metadata }
    }

    /// Returns the root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the preserved metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
