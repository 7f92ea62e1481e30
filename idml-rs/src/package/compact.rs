//! Empty-element compaction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// An open tag immediately followed by a close tag. The names are checked
/// for equality in the replacer since the regex engine has no
/// backreferences.
static EMPTY_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([A-Za-z_][\w.:\-]*)((?:\s+[^\s=<>/"']+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*></([A-Za-z_][\w.:\-]*)>"#,
    )
    .expect("valid empty element regex")
});

/// Rewrites `<Tag attrs></Tag>` to `<Tag attrs />` in a single forward pass.
///
/// Left untouched: self-closing tags, elements with any content (including
/// whitespace-only text) and pairs whose names differ. Replaced output is
/// not scanned again, so a parent that only contained an empty child stays
/// an open/close pair.
pub fn compact_empty_elements(input: &str) -> String {
    EMPTY_PAIR
        .replace_all(input, |caps: &Captures<'_>| {
            if caps[1] == caps[3] {
                format!("<{}{} />", &caps[1], &caps[2])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Byte variant of [`compact_empty_elements`]; invalid UTF-8 is replaced.
pub fn compact_empty_elements_bytes(input: &[u8]) -> Vec<u8> {
    compact_empty_elements(&String::from_utf8_lossy(input)).into_bytes()
}
