//! Structural comparison of two element trees.
//!
//! The walk is a pre-order traversal over positionally paired nodes.
//! Children of tags listed in [`CompareOptions::unordered_tags`] are stably
//! sorted by tag name first; siblings sharing a tag are never realigned by
//! identity, so reordered same-tag siblings with different attributes still
//! produce differences.

use indexmap::IndexMap;

use super::difference::{truncate_text, Difference, DifferenceKind};
use super::options::CompareOptions;
use crate::error::Result;
use crate::node::{Attribute, Element};
use crate::xml::TreeParser;

/// Path of the root node in difference records.
const ROOT_PATH: &str = "root";

/// Compares element trees under a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    /// Creates a comparator with the default policy.
    pub fn new() -> Self {
        Self::with_options(CompareOptions::default_policy())
    }

    /// Creates a comparator with the given policy.
    pub fn with_options(options: CompareOptions) -> Self {
        Comparator { options }
    }

    /// Returns the active policy.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compares two optional roots.
    pub fn compare(&self, original: Option<&Element>, generated: Option<&Element>) -> Vec<Difference> {
        compare(original, generated, &self.options)
    }

    /// Parses both inputs and compares the resulting trees.
    pub fn compare_bytes(
        &self,
        original: Option<&[u8]>,
        generated: Option<&[u8]>,
    ) -> Result<Vec<Difference>> {
        compare_bytes(original, generated, &self.options)
    }
}

/// Compares two optional roots under `options`.
///
/// Both absent yields nothing; exactly one absent yields a single
/// `structure` difference. Never fails.
pub fn compare(
    original: Option<&Element>,
    generated: Option<&Element>,
    options: &CompareOptions,
) -> Vec<Difference> {
    let mut walker = Walker {
        options,
        differences: Vec::new(),
    };

    match (original, generated) {
        (None, None) => {}
        (Some(a), None) => walker.push(Difference::new(
            ROOT_PATH,
            DifferenceKind::Structure,
            "root element missing in generated",
            a.tag(),
            "<none>",
        )),
        (None, Some(b)) => walker.push(Difference::new(
            ROOT_PATH,
            DifferenceKind::Structure,
            "root element missing in original",
            "<none>",
            b.tag(),
        )),
        (Some(a), Some(b)) => walker.walk(a, b, ROOT_PATH),
    }

    log::debug!("comparison found {} difference(s)", walker.differences.len());
    walker.differences
}

/// Parses both inputs, then compares them under `options`.
///
/// Input and parse errors are returned before any comparison happens.
pub fn compare_bytes(
    original: Option<&[u8]>,
    generated: Option<&[u8]>,
    options: &CompareOptions,
) -> Result<Vec<Difference>> {
    let a = TreeParser::with_context("parse original").parse(original)?;
    let b = TreeParser::with_context("parse generated").parse(generated)?;
    Ok(compare(Some(&a), Some(&b), options))
}

/// Traversal state for one comparison.
struct Walker<'o> {
    options: &'o CompareOptions,
    differences: Vec<Difference>,
}

impl Walker<'_> {
    fn is_full(&self) -> bool {
        self.options.is_capped(self.differences.len())
    }

    fn push(&mut self, difference: Difference) {
        if !self.is_full() {
            self.differences.push(difference);
        }
    }

    fn walk(&mut self, a: &Element, b: &Element, path: &str) {
        if self.is_full() {
            return;
        }

        if a.tag() != b.tag() {
            log::trace!("tag mismatch at {}: {} vs {}", path, a.tag(), b.tag());
            self.push(Difference::new(
                path,
                DifferenceKind::Tag,
                "tag mismatch",
                a.tag(),
                b.tag(),
            ));
            return;
        }

        if a.namespace() != b.namespace() {
            self.push(Difference::new(
                path,
                DifferenceKind::Namespace,
                format!("namespace mismatch for <{}>", a.tag()),
                a.namespace(),
                b.namespace(),
            ));
        }

        self.compare_attributes(a, b, path);
        self.compare_text(a, b, path);
        self.compare_children(a, b, path);
    }

    fn compare_attributes(&mut self, a: &Element, b: &Element, path: &str) {
        let left = attribute_map(a);
        let right = attribute_map(b);

        for (&(ns, name), &value) in &left {
            if !right.contains_key(&(ns, name)) {
                self.push(Difference::new(
                    path,
                    DifferenceKind::Attribute,
                    format!(
                        "attribute {} missing in generated",
                        Attribute::display_key(ns, name)
                    ),
                    value,
                    "",
                ));
            }
        }

        for (&(ns, name), &value) in &right {
            if !left.contains_key(&(ns, name)) {
                self.push(Difference::new(
                    path,
                    DifferenceKind::Attribute,
                    format!(
                        "attribute {} exists in generated but not in original",
                        Attribute::display_key(ns, name)
                    ),
                    "",
                    value,
                ));
            }
        }

        for (&(ns, name), &value) in &left {
            match right.get(&(ns, name)) {
                Some(&other) if other != value => self.push(Difference::new(
                    path,
                    DifferenceKind::Attribute,
                    format!(
                        "attribute {} value mismatch",
                        Attribute::display_key(ns, name)
                    ),
                    value,
                    other,
                )),
                _ => {}
            }
        }
    }

    fn compare_text(&mut self, a: &Element, b: &Element, path: &str) {
        let (left, right) = if self.options.ignore_whitespace {
            (a.text().trim(), b.text().trim())
        } else {
            (a.text(), b.text())
        };

        if left != right {
            self.push(Difference::new(
                path,
                DifferenceKind::Text,
                "text content mismatch",
                truncate_text(left),
                truncate_text(right),
            ));
        }
    }

    fn compare_children(&mut self, a: &Element, b: &Element, path: &str) {
        let mut left: Vec<&Element> = a.children().iter().collect();
        let mut right: Vec<&Element> = b.children().iter().collect();

        if self.options.is_unordered(a.tag()) {
            // Stable: siblings sharing a tag keep their relative order.
            left.sort_by(|x, y| x.tag().cmp(y.tag()));
            right.sort_by(|x, y| x.tag().cmp(y.tag()));
        }

        if left.len() != right.len() {
            self.push(Difference::new(
                path,
                DifferenceKind::Structure,
                format!(
                    "child count mismatch: expected {}, got {}",
                    left.len(),
                    right.len()
                ),
                left.len().to_string(),
                right.len().to_string(),
            ));
        }

        for (index, (x, y)) in left.iter().zip(right.iter()).enumerate() {
            if self.is_full() {
                return;
            }
            let child_path = format!("{}/{}[{}]", path, x.tag(), index);
            self.walk(x, y, &child_path);
        }
    }
}

/// Maps `(namespace, name)` to value, keeping document order.
fn attribute_map(element: &Element) -> IndexMap<(&str, &str), &str> {
    element
        .attributes()
        .iter()
        .map(|attr| (attr.key(), attr.value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn diff(a: &str, b: &str, options: &CompareOptions) -> Vec<Difference> {
        let a = parse_str(a).unwrap();
        let b = parse_str(b).unwrap();
        compare(Some(&a), Some(&b), options)
    }

    #[test]
    fn test_identical_trees() {
        let xml = r#"<root a="1"><child>value</child><other/></root>"#;
        assert!(diff(xml, xml, &CompareOptions::default()).is_empty());
        assert!(diff(xml, xml, &CompareOptions::strict()).is_empty());
    }

    #[test]
    fn test_missing_roots() {
        let options = CompareOptions::default();
        let a = Element::new("Graphic");
        assert!(compare(None, None, &options).is_empty());

        let d = compare(Some(&a), None, &options);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].kind, DifferenceKind::Structure);
        assert_eq!(d[0].path, "root");
        assert_eq!(d[0].expected, "Graphic");

        let d = compare(None, Some(&a), &options);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].actual, "Graphic");
    }

    #[test]
    fn test_tag_mismatch_stops_descent() {
        let d = diff(
            "<root><child1>value</child1></root>",
            "<root><child2>value</child2></root>",
            &CompareOptions::default(),
        );
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].kind, DifferenceKind::Tag);
        assert_eq!(d[0].path, "root/child1[0]");
        assert_eq!(d[0].expected, "child1");
        assert_eq!(d[0].actual, "child2");

        let d = diff(
            r#"<a x="1">t<b/></a>"#,
            r#"<z y="2">u</z>"#,
            &CompareOptions::default(),
        );
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_namespace_mismatch_continues() {
        let d = diff(
            r#"<a xmlns="urn:one" k="1"/>"#,
            r#"<a xmlns="urn:two" k="2"/>"#,
            &CompareOptions::default(),
        );
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].kind, DifferenceKind::Namespace);
        assert_eq!(d[0].expected, "urn:one");
        assert_eq!(d[1].kind, DifferenceKind::Attribute);
    }

    #[test]
    fn test_attribute_order_is_insignificant() {
        let d = diff(
            r#"<root a="1" b="2"/>"#,
            r#"<root b="2" a="1"/>"#,
            &CompareOptions::default(),
        );
        assert!(d.is_empty());
    }

    #[test]
    fn test_attribute_differences_in_order() {
        let d = diff(
            r#"<root keep="1" gone="x" changed="a"/>"#,
            r#"<root changed="b" keep="1" added="y"/>"#,
            &CompareOptions::default(),
        );
        assert_eq!(d.len(), 3);
        assert_eq!(d[0].description, "attribute gone missing in generated");
        assert_eq!(d[0].expected, "x");
        assert_eq!(
            d[1].description,
            "attribute added exists in generated but not in original"
        );
        assert_eq!(d[1].actual, "y");
        assert_eq!(d[2].description, "attribute changed value mismatch");
        assert_eq!((d[2].expected.as_str(), d[2].actual.as_str()), ("a", "b"));
    }

    #[test]
    fn test_whitespace_policy() {
        let a = "<root><t>  value \n</t></root>";
        let b = "<root><t>value</t></root>";
        assert!(diff(a, b, &CompareOptions::default()).is_empty());

        let d = diff(a, b, &CompareOptions::strict());
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].kind, DifferenceKind::Text);
        assert_eq!(d[0].path, "root/t[0]");
    }

    #[test]
    fn test_text_values_truncated() {
        let long_a = "a".repeat(300);
        let long_b = "b".repeat(300);
        let d = diff(
            &format!("<t>{}</t>", long_a),
            &format!("<t>{}</t>", long_b),
            &CompareOptions::default(),
        );
        assert_eq!(d[0].expected, format!("{}...", "a".repeat(100)));
        assert_eq!(d[0].actual, format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn test_child_count_mismatch_then_positional() {
        let d = diff(
            "<root><a/><b/><c/></root>",
            "<root><a/><x/></root>",
            &CompareOptions::default(),
        );
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].kind, DifferenceKind::Structure);
        assert_eq!((d[0].expected.as_str(), d[0].actual.as_str()), ("3", "2"));
        assert_eq!(d[1].kind, DifferenceKind::Tag);
        assert_eq!(d[1].path, "root/b[1]");
    }

    #[test]
    fn test_cap_is_exact() {
        let a = "<root><a/><b/><c/><d/><e/></root>";
        let b = "<root><v/><w/><x/><y/><z/></root>";
        let unlimited = diff(a, b, &CompareOptions::strict());
        assert_eq!(unlimited.len(), 5);

        let capped = diff(a, b, &CompareOptions::strict().with_max_differences(3));
        assert_eq!(capped.len(), 3);
        assert_eq!(capped, unlimited[..3].to_vec());
    }

    #[test]
    fn test_cap_applies_within_attributes() {
        let d = diff(
            r#"<root a="1" b="1" c="1" d="1"/>"#,
            r#"<root/>"#,
            &CompareOptions::strict().with_max_differences(2),
        );
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_unordered_group_reorder_same_content() {
        let a = r#"<Graphic><Swatch/><Color Name="x"/><Ink/></Graphic>"#;
        let b = r#"<Graphic><Ink/><Color Name="x"/><Swatch/></Graphic>"#;
        let options = CompareOptions::default().with_unordered_tag("Graphic");
        assert!(diff(a, b, &options).is_empty());
        assert_eq!(diff(a, b, &CompareOptions::default()).len(), 2);
    }

    #[test]
    fn test_unordered_group_does_not_match_by_identity() {
        let a = r#"<Graphic><Color Name="Black"/><Color Name="Paper"/></Graphic>"#;
        let b = r#"<Graphic><Color Name="Paper"/><Color Name="Black"/></Graphic>"#;
        let options = CompareOptions::default().with_unordered_tag("Graphic");
        let d = diff(a, b, &options);
        assert_eq!(d.len(), 2);
        assert!(d.iter().all(|x| x.kind == DifferenceKind::Attribute));
        assert_eq!(d[0].path, "root/Color[0]");
    }

    #[test]
    fn test_unordered_applies_to_original_tag_only() {
        // Children of <Color> in the default set are sorted before pairing.
        let a = r#"<Color><b/><a/></Color>"#;
        let b = r#"<Color><a/><b/></Color>"#;
        assert!(diff(a, b, &CompareOptions::default()).is_empty());
    }

    #[test]
    fn test_comparator_bytes_errors() {
        let comparator = Comparator::new();
        assert!(matches!(
            comparator.compare_bytes(None, Some(b"<a/>")),
            Err(crate::Error::NilInput)
        ));
        assert!(matches!(
            comparator.compare_bytes(Some(b"<a/>"), Some(b"")),
            Err(crate::Error::EmptyInput)
        ));
        match comparator.compare_bytes(Some(b"<a/>"), Some(b"<a>")) {
            Err(crate::Error::Parse { context, .. }) => assert_eq!(context, "parse generated"),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(comparator
            .compare_bytes(Some(b"<a/>"), Some(b"<a></a>"))
            .unwrap()
            .is_empty());
    }
}
