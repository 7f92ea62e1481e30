//! Namespace scope tracking for serialization.

use std::collections::BTreeMap;

use crate::constants::XML_NAMESPACE;

/// Tracks prefix bindings while walking a tree.
///
/// The empty prefix holds the default namespace. Scopes use ordered maps so
/// that prefix selection is deterministic when several prefixes share a URI.
#[derive(Debug)]
pub struct NamespaceContext {
    /// Stack of scopes, each containing prefix -> URI bindings.
    scopes: Vec<BTreeMap<String, String>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the `xml` prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            scopes: vec![BTreeMap::new()],
        };
        ctx.bind("xml", XML_NAMESPACE);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolves a prefix to its URI, searching from innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(String::as_str)
    }

    /// Returns the default namespace, empty when none is in effect.
    pub fn default_namespace(&self) -> &str {
        self.resolve("").unwrap_or_default()
    }

    /// Finds a non-empty prefix currently bound to `uri`.
    ///
    /// A prefix that is shadowed by an inner binding to another URI is
    /// skipped.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for (prefix, bound) in scope {
                if !prefix.is_empty() && bound == uri && self.resolve(prefix) == Some(uri) {
                    return Some(prefix);
                }
            }
        }
        None
    }
}

/// Splits a raw tag name at its first colon: `idPkg:Story` gives
/// `(Some("idPkg"), "Story")`, an unprefixed name gives `(None, name)`.
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

/// Checks if a raw attribute name is a namespace declaration.
pub fn is_xmlns_attr(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}
