//! Comparison policy.

use std::collections::BTreeSet;

use crate::constants::{DEFAULT_MAX_DIFFERENCES, DEFAULT_UNORDERED_TAGS};

/// Policy applied by the structural comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Tags whose children are compared after a stable sort by tag name.
    pub unordered_tags: BTreeSet<String>,
    /// Stop collecting after this many differences (0 = unlimited).
    pub max_differences: usize,
    /// Trim text on both sides before comparing it.
    pub ignore_whitespace: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl CompareOptions {
    /// Returns a fresh copy of the default IDML policy.
    ///
    /// Order-insensitive tags: FontFamily, Color, ParagraphStyle,
    /// CharacterStyle and ObjectStyle. At most 100 differences, whitespace
    /// ignored.
    pub fn default_policy() -> Self {
        CompareOptions {
            unordered_tags: DEFAULT_UNORDERED_TAGS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_differences: DEFAULT_MAX_DIFFERENCES,
            ignore_whitespace: true,
        }
    }

    /// A policy with no unordered tags, no cap and exact text comparison.
    pub fn strict() -> Self {
        CompareOptions {
            unordered_tags: BTreeSet::new(),
            max_differences: 0,
            ignore_whitespace: false,
        }
    }

    /// Adds a tag whose children are compared order-insensitively.
    pub fn with_unordered_tag(mut self, tag: impl Into<String>) -> Self {
        self.unordered_tags.insert(tag.into());
        self
    }

    /// Sets the difference cap (0 = unlimited).
    pub fn with_max_differences(mut self, max: usize) -> Self {
        self.max_differences = max;
        self
    }

    /// Sets whether text is trimmed before comparison.
    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    /// Returns true if children of `tag` are compared order-insensitively.
    pub fn is_unordered(&self, tag: &str) -> bool {
        self.unordered_tags.contains(tag)
    }

    /// Returns true once `count` differences fill the cap.
    pub fn is_capped(&self, count: usize) -> bool {
        self.max_differences != 0 && count >= self.max_differences
    }
}
