//! Element and attribute types for the generic XML tree.
//!
//! Trees are built bottom-up by the parser (or by producers through the
//! consuming `with_*` builders) and are not mutated afterwards.

use crate::constants::XMLNS_NAMESPACE;

/// A single attribute: namespace, local name and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Attribute {
    namespace: String,
    name: String,
    value: String,
}

impl Attribute {
    /// Creates an attribute in no namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_namespace("", name, value)
    }

    /// Creates an attribute in the given namespace.
    pub fn with_namespace(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Attribute {
            namespace: namespace.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an `xmlns:prefix="uri"` declaration.
    pub fn namespace_declaration(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::with_namespace(XMLNS_NAMESPACE, prefix, uri)
    }

    /// Returns the namespace (URI, or prefix when it could not be resolved).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the identity of this attribute within an element.
    pub fn key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }

    /// Returns true for `xmlns:prefix` declarations.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace == XMLNS_NAMESPACE
    }

    /// Renders the key for reports: `name`, or `{namespace}name`.
    pub fn display_key(namespace: &str, name: &str) -> String {
        if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{{{}}}{}", namespace, name)
        }
    }
}

/// An element node: tag, namespace, attributes, text and children.
///
/// `text` holds all character data found directly inside the element,
/// concatenated in document order and left untrimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    namespace: String,
    attributes: Vec<Attribute>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Creates an element with no namespace, attributes, text or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Adds an attribute, replacing one with the same `(namespace, name)`.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.push_attribute(attribute);
        self
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child elements.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns the local name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the raw text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the children in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Looks up an attribute value by namespace and name.
    pub fn attribute(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key() == (namespace, name))
            .map(Attribute::value)
    }

    /// Returns the first child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Best-effort: value of an un-namespaced attribute, or `""` if absent.
    pub fn attribute_value(&self, name: &str) -> &str {
        self.attribute("", name).unwrap_or_default()
    }

    /// Best-effort: trimmed text of the first child named `tag`, or `""`.
    ///
    /// Missing children are not an error here. Callers needing to tell
    /// "absent" from "empty" should use [`Element::child`].
    pub fn child_text(&self, tag: &str) -> String {
        self.child(tag)
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default()
    }

    /// Returns true if the element has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }

    /// Counts this element and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Element::node_count).sum::<usize>()
    }

    pub(crate) fn push_attribute(&mut self, attribute: Attribute) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.key() == attribute.key())
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}
