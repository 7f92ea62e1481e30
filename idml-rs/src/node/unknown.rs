//! Passthrough for children a typed consumer does not recognise.
//!
//! Newer InDesign versions add elements that older consumers have no field
//! for. Rather than dropping them, a consumer splits them off into a
//! [`CatchAll`] and restores them at their original positions before
//! encoding, so the output keeps them in place.

use crate::error::{Error, Result};
use crate::package::compact_empty_elements;
use crate::xml::print_to_string_compact;

use super::Element;

/// An element kept verbatim because nothing claimed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownElement {
    /// Local name of the element.
    pub name: String,
    /// Single-line serialization of the whole subtree.
    pub raw: String,
    /// The subtree itself.
    pub element: Element,
}

impl UnknownElement {
    /// Captures an element and its serialized form.
    pub fn capture(element: &Element) -> Result<Self> {
        let printed =
            print_to_string_compact(element).map_err(|e| Error::Encode(e.to_string()))?;
        Ok(UnknownElement {
            name: element.tag().to_string(),
            raw: compact_empty_elements(&printed),
            element: element.clone(),
        })
    }
}

/// Unknown children of one parent, each with its original index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchAll {
    entries: Vec<(usize, UnknownElement)>,
}

impl CatchAll {
    /// Separates `parent`'s children into known ones (returned in order)
    /// and unknown ones (captured with their positions).
    pub fn split<'a>(
        parent: &'a Element,
        is_known: impl Fn(&Element) -> bool,
    ) -> Result<(Vec<&'a Element>, CatchAll)> {
        let mut known = Vec::new();
        let mut catch_all = CatchAll::default();
        for (index, child) in parent.children().iter().enumerate() {
            if is_known(child) {
                known.push(child);
            } else {
                catch_all.entries.push((index, UnknownElement::capture(child)?));
            }
        }
        if !catch_all.is_empty() {
            log::debug!(
                "kept {} unknown child(ren) of <{}>",
                catch_all.len(),
                parent.tag()
            );
        }
        Ok((known, catch_all))
    }

    /// Interleaves the captured elements back into `known`.
    ///
    /// Positions past the end of the list are appended in order.
    pub fn restore(&self, known: Vec<Element>) -> Vec<Element> {
        let mut out = Vec::with_capacity(known.len() + self.entries.len());
        let mut unknown = self.entries.iter().peekable();
        let mut known = known.into_iter();

        loop {
            if let Some((_, entry)) = unknown.next_if(|(index, _)| *index <= out.len()) {
                out.push(entry.element.clone());
                continue;
            }
            match known.next() {
                Some(element) => out.push(element),
                None => break,
            }
        }
        out.extend(unknown.map(|(_, entry)| entry.element.clone()));
        out
    }

    /// Number of captured elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(position, element)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &UnknownElement)> {
        self.entries.iter().map(|(index, entry)| (*index, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;
    use crate::xml::parse_str;

    fn spread() -> Element {
        parse_str(
            r#"<Spread Self="s1"><Page Self="p1"/><FutureThing Mode="on"><Inner/></FutureThing><TextFrame Self="t1"/><Unseen/></Spread>"#,
        )
        .unwrap()
    }

    fn is_known(element: &Element) -> bool {
        matches!(element.tag(), "Page" | "TextFrame")
    }

    #[test]
    fn test_capture_raw_is_compact() {
        let element = Element::new("FutureThing")
            .with_attribute(Attribute::new("Mode", "on"))
            .with_child(Element::new("Inner"));
        let unknown = UnknownElement::capture(&element).unwrap();
        assert_eq!(unknown.name, "FutureThing");
        assert_eq!(unknown.raw, r#"<FutureThing Mode="on"><Inner /></FutureThing>"#);
    }

    #[test]
    fn test_split_keeps_positions() {
        let root = spread();
        let (known, catch_all) = CatchAll::split(&root, is_known).unwrap();

        let known_tags: Vec<&str> = known.iter().map(|e| e.tag()).collect();
        assert_eq!(known_tags, ["Page", "TextFrame"]);

        let positions: Vec<(usize, &str)> = catch_all
            .iter()
            .map(|(index, entry)| (index, entry.name.as_str()))
            .collect();
        assert_eq!(positions, [(1, "FutureThing"), (3, "Unseen")]);
    }

    #[test]
    fn test_restore_reproduces_original_order() {
        let root = spread();
        let (known, catch_all) = CatchAll::split(&root, is_known).unwrap();
        let restored = catch_all.restore(known.into_iter().cloned().collect());
        assert_eq!(restored, root.children());
    }

    #[test]
    fn test_restore_appends_positions_past_end() {
        let root = spread();
        let (_, catch_all) = CatchAll::split(&root, is_known).unwrap();
        // The known children were dropped by the consumer.
        let restored = catch_all.restore(Vec::new());
        let tags: Vec<&str> = restored.iter().map(Element::tag).collect();
        assert_eq!(tags, ["FutureThing", "Unseen"]);
    }

    #[test]
    fn test_nothing_unknown() {
        let root = parse_str("<Spread><Page/></Spread>").unwrap();
        let (known, catch_all) = CatchAll::split(&root, is_known).unwrap();
        assert_eq!(known.len(), 1);
        assert!(catch_all.is_empty());
        assert_eq!(catch_all.len(), 0);
    }
}
