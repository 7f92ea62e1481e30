//! The `idPkg:` namespace wrapper around IDML package parts.
//!
//! Each part of an IDML package (Graphic.xml, Styles.xml, a Story, ...)
//! has a root like `<idPkg:Graphic xmlns:idPkg="..." DOMVersion="20.4">`.
//! Decoding locates that element in the token stream and hands its subtree
//! to a [`FromElement`] consumer; encoding puts the wrapper back around a
//! [`ToElement`] producer.

use quick_xml::events::Event;

use crate::constants::{DOM_VERSION_ATTR, IDPKG_PREFIX, IDPKG_URI};
use crate::error::{require_input, Error, Result};
use crate::node::{split_qname, Attribute, Element, Metadata};
use crate::xml::parser::{element_from_start, new_reader, read_subtree, resolved_namespace};

use super::{encode, FromElement, ToElement};

/// A namespace prefix and URI identifying wrapper elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    /// Prefix used on the wrapper element, e.g. `idPkg`.
    pub prefix: String,
    /// Namespace URI bound to the prefix.
    pub uri: String,
}

/// Content decoded from inside a wrapper element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped<T> {
    /// The wrapper's `DOMVersion`, empty when the attribute is absent.
    pub dom_version: String,
    /// The decoded content.
    pub content: T,
}

impl Default for Wrapper {
    fn default() -> Self {
        Self::idml()
    }
}

impl Wrapper {
    /// Creates a wrapper for an arbitrary prefix and URI.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Wrapper {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The IDML packaging wrapper (`idPkg`).
    pub fn idml() -> Self {
        Self::new(IDPKG_PREFIX, IDPKG_URI)
    }

    /// Returns `prefix:element_name`.
    pub fn qualified_name(&self, element_name: &str) -> String {
        format!("{}:{}", self.prefix, element_name)
    }

    /// Finds the wrapper element and decodes its subtree.
    ///
    /// The first start tag whose raw name is `prefix:element_name`, or whose
    /// namespace is the wrapper URI, is taken as the wrapper. Reaching the
    /// end of input first yields [`Error::WrapperNotFound`].
    pub fn decode<T: FromElement>(
        &self,
        input: Option<&[u8]>,
        element_name: &str,
    ) -> Result<Unwrapped<T>> {
        let bytes = require_input(input)?;
        let qname = self.qualified_name(element_name);
        let context = format!("unwrap {}", qname);

        let mut reader = new_reader(bytes);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let (resolve, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| Error::parse(&context, e))?;
            let namespace = resolved_namespace(resolve);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let raw = std::str::from_utf8(e.name().as_ref())
                        .map_err(|e| Error::parse(&context, e))?
                        .to_string();
                    let by_name = match split_qname(&raw) {
                        (Some(prefix), local) => prefix == self.prefix && local == element_name,
                        (None, _) => false,
                    };
                    if !by_name && namespace != self.uri {
                        continue;
                    }
                    let is_empty = matches!(event, Event::Empty(_));
                    let start = element_from_start(&reader, namespace, e, &context)?;
                    let dom_version = start.attribute_value(DOM_VERSION_ATTR).to_string();
                    let element = read_subtree(&mut reader, start, is_empty, &context)?;
                    log::debug!(
                        "unwrapped {} (DOMVersion {:?}, {} nodes)",
                        qname,
                        dom_version,
                        element.node_count()
                    );
                    return Ok(Unwrapped {
                        dom_version,
                        content: T::from_element(&element)?,
                    });
                }
                Event::Eof => return Err(Error::WrapperNotFound { element: qname }),
                _ => {}
            }
        }
    }

    /// Best-effort: the `DOMVersion` of the wrapper element, or `""` when
    /// the input is unusable or has no such wrapper.
    pub fn dom_version(&self, input: &[u8], element_name: &str) -> String {
        self.decode::<Element>(Some(input), element_name)
            .map(|unwrapped| unwrapped.dom_version)
            .unwrap_or_default()
    }

    /// Puts `content` inside a wrapper element.
    ///
    /// The result carries `xmlns:prefix` and `DOMVersion` first, then the
    /// content's own attributes (those not already present), text and
    /// children.
    pub fn wrap(&self, element_name: &str, dom_version: &str, content: &Element) -> Element {
        let mut wrapped = Element::new(element_name)
            .with_namespace(self.uri.as_str())
            .with_attribute(Attribute::namespace_declaration(
                self.prefix.as_str(),
                self.uri.as_str(),
            ))
            .with_attribute(Attribute::new(DOM_VERSION_ATTR, dom_version));

        for attr in content.attributes() {
            if wrapped.attribute(attr.namespace(), attr.name()).is_none() {
                wrapped.push_attribute(attr.clone());
            }
        }
        wrapped.push_text(content.text());
        wrapped.with_children(content.children().iter().cloned())
    }

    /// Wraps a producer's content and encodes it with `metadata`.
    pub fn encode<T: ToElement + ?Sized>(
        &self,
        element_name: &str,
        dom_version: &str,
        content: &T,
        metadata: &Metadata,
    ) -> Result<Vec<u8>> {
        let wrapped = self.wrap(element_name, dom_version, &content.to_element()?);
        encode(&wrapped, metadata)
    }
}

/// Decodes the content of an `idPkg:` wrapper element as a plain tree.
pub fn unwrap_element(input: Option<&[u8]>, element_name: &str) -> Result<Unwrapped<Element>> {
    Wrapper::idml().decode(input, element_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const GRAPHIC: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <idPkg:Graphic xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="20.4">
          <Color Self="Color/Black" Model="Process" Name="Black" />
          <Color Self="Color/Paper" Model="Process" Name="Paper" />
        </idPkg:Graphic>
    "#};

    /// A typed consumer that only cares about color names.
    #[derive(Debug, PartialEq)]
    struct ColorNames(Vec<String>);

    impl FromElement for ColorNames {
        fn from_element(element: &Element) -> Result<Self> {
            Ok(ColorNames(
                element
                    .children()
                    .iter()
                    .filter(|c| c.tag() == "Color")
                    .map(|c| c.attribute_value("Name").to_string())
                    .collect(),
            ))
        }
    }

    #[test]
    fn test_decode_wrapped_content() {
        let unwrapped: Unwrapped<ColorNames> = Wrapper::idml()
            .decode(Some(GRAPHIC.as_bytes()), "Graphic")
            .unwrap();
        assert_eq!(unwrapped.dom_version, "20.4");
        assert_eq!(
            unwrapped.content,
            ColorNames(vec!["Black".to_string(), "Paper".to_string()])
        );
    }

    #[test]
    fn test_decode_by_namespace_uri() {
        let xml = format!(r#"<pkg:Styles xmlns:pkg="{}" DOMVersion="19.0"/>"#, IDPKG_URI);
        let unwrapped = unwrap_element(Some(xml.as_bytes()), "Styles").unwrap();
        assert_eq!(unwrapped.dom_version, "19.0");
        assert_eq!(unwrapped.content.tag(), "Styles");
        assert_eq!(unwrapped.content.namespace(), IDPKG_URI);
    }

    #[test]
    fn test_decode_matches_prefix_and_local_name() {
        // A same-named element under another prefix is skipped; an unbound
        // idPkg prefix still matches by name.
        let xml = br#"<root><other:Graphic xmlns:other="urn:other"/><idPkg:Graphic DOMVersion="18.0"><Color/></idPkg:Graphic></root>"#;
        let unwrapped = unwrap_element(Some(&xml[..]), "Graphic").unwrap();
        assert_eq!(unwrapped.dom_version, "18.0");
        assert_eq!(unwrapped.content.namespace(), IDPKG_PREFIX);
        assert_eq!(unwrapped.content.children().len(), 1);
    }

    #[test]
    fn test_missing_dom_version_is_empty() {
        let xml = format!(r#"<idPkg:Tags xmlns:idPkg="{}"><XMLTag/></idPkg:Tags>"#, IDPKG_URI);
        let unwrapped = unwrap_element(Some(xml.as_bytes()), "Tags").unwrap();
        assert_eq!(unwrapped.dom_version, "");
        assert_eq!(unwrapped.content.children().len(), 1);
    }

    #[test]
    fn test_wrapper_not_found() {
        let err = unwrap_element(Some(b"<Document><Spread/></Document>"), "Graphic").unwrap_err();
        match err {
            Error::WrapperNotFound { element } => assert_eq!(element, "idPkg:Graphic"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_input_checks() {
        assert!(matches!(unwrap_element(None, "Graphic"), Err(Error::NilInput)));
        assert!(matches!(
            unwrap_element(Some(b""), "Graphic"),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_decode_parse_error_has_context() {
        let xml = format!(r#"<idPkg:Graphic xmlns:idPkg="{}"><Color></idPkg:Graphic>"#, IDPKG_URI);
        match unwrap_element(Some(xml.as_bytes()), "Graphic").unwrap_err() {
            Error::Parse { context, .. } => assert_eq!(context, "unwrap idPkg:Graphic"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dom_version_best_effort() {
        let wrapper = Wrapper::idml();
        assert_eq!(wrapper.dom_version(GRAPHIC.as_bytes(), "Graphic"), "20.4");
        assert_eq!(wrapper.dom_version(b"", "Graphic"), "");
        assert_eq!(wrapper.dom_version(b"<a><b></a>", "Graphic"), "");
    }

    #[test]
    fn test_wrap_orders_attributes() {
        let content = Element::new("Graphic")
            .with_attribute(Attribute::new(DOM_VERSION_ATTR, "1.0"))
            .with_attribute(Attribute::new("Self", "g"))
            .with_child(Element::new("Color"));
        let wrapped = Wrapper::idml().wrap("Graphic", "20.4", &content);

        assert_eq!(wrapped.namespace(), IDPKG_URI);
        let names: Vec<&str> = wrapped.attributes().iter().map(Attribute::name).collect();
        assert_eq!(names, ["idPkg", DOM_VERSION_ATTR, "Self"]);
        assert_eq!(wrapped.attribute_value(DOM_VERSION_ATTR), "20.4");
        assert_eq!(wrapped.children().len(), 1);
    }

    #[test]
    fn test_encode_then_decode() {
        let content = Element::new("Graphic").with_child(
            Element::new("Color").with_attribute(Attribute::new("Name", "Black")),
        );
        let wrapper = Wrapper::idml();
        let bytes = wrapper
            .encode("Graphic", "20.4", &content, &Metadata::default())
            .unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(
            text,
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
                 <idPkg:Graphic xmlns:idPkg=\"{}\" DOMVersion=\"20.4\">\n  \
                 <Color Name=\"Black\" />\n\
                 </idPkg:Graphic>",
                IDPKG_URI
            )
        );

        let unwrapped: Unwrapped<ColorNames> = wrapper.decode(Some(&bytes), "Graphic").unwrap();
        assert_eq!(unwrapped.dom_version, "20.4");
        assert_eq!(unwrapped.content, ColorNames(vec!["Black".to_string()]));
    }
}
