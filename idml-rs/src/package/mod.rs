//! Decoding and encoding of IDML package parts.
//!
//! The round trip is:
//!
//! 1. [`Metadata::extract`] pulls the declaration, processing instructions
//!    and root namespace prefixes out of the raw bytes.
//! 2. The tree parser builds an [`Element`] tree.
//! 3. On the way back, the prolog is written, the tree is printed by the
//!    generic [`XmlPrinter`](crate::xml::XmlPrinter), prefixes are restored
//!    with [`fix_namespace_prefixes`] and empty pairs are compacted.

mod compact;
mod metadata;
mod wrapper;

pub use compact::{compact_empty_elements, compact_empty_elements_bytes};
pub use metadata::fix_namespace_prefixes;
pub use wrapper::{unwrap_element, Unwrapped, Wrapper};

use crate::error::{require_input, Error, Result};
use crate::node::{Document, Element, Metadata};
use crate::xml::{print_to_string, TreeParser};

/// Conversion from a generic tree into a typed consumer.
pub trait FromElement: Sized {
    /// Builds `Self` from a decoded element.
    fn from_element(element: &Element) -> Result<Self>;
}

/// Conversion from a typed producer into a generic tree.
pub trait ToElement {
    /// Builds the element tree to encode.
    fn to_element(&self) -> Result<Element>;
}

impl FromElement for Element {
    fn from_element(element: &Element) -> Result<Self> {
        Ok(element.clone())
    }
}

impl ToElement for Element {
    fn to_element(&self) -> Result<Element> {
        Ok(self.clone())
    }
}

/// Decodes a complete document, keeping its metadata.
pub fn decode_document(input: Option<&[u8]>) -> Result<Document> {
    let bytes = require_input(input)?;
    let metadata = Metadata::extract(bytes);
    let root = TreeParser::with_context("decode document").parse_bytes(bytes)?;
    Ok(Document::new(root, metadata))
}

/// Encodes a document with its own metadata.
pub fn encode_document(document: &Document) -> Result<Vec<u8>> {
    encode(document.root(), document.metadata())
}

/// Encodes content with a preserved prolog and namespace prefixes.
///
/// Fails only when the content cannot be converted or printed; the
/// textual fixups afterwards cannot fail.
pub fn encode<T: ToElement + ?Sized>(content: &T, metadata: &Metadata) -> Result<Vec<u8>> {
    let root = content.to_element()?;
    let body = print_to_string(&root).map_err(|e| Error::Encode(e.to_string()))?;

    let body = if metadata.namespaces.is_empty() {
        body
    } else {
        fix_namespace_prefixes(&body, &metadata.namespaces)
    };

    let mut out = metadata.prolog();
    out.push_str(&compact_empty_elements(&body));
    log::debug!(
        "encoded <{}> ({} nodes, {} bytes)",
        root.tag(),
        root.node_count(),
        out.len()
    );
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare, CompareOptions};
    use crate::constants::IDPKG_URI;
    use crate::node::{Attribute, ProcessingInstruction};
    use indoc::indoc;

    const STYLES: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <?aid style="50" type="document" readerVersion="6.0" featureSet="257" product="20.4(55)"?>
        <idPkg:Styles xmlns:idPkg="http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging" DOMVersion="20.4">
          <RootParagraphStyleGroup Self="u79">
            <ParagraphStyle Self="ParagraphStyle/$ID/NormalParagraphStyle" Name="$ID/NormalParagraphStyle" />
            <ParagraphStyle Self="ParagraphStyle/Heading" Name="Heading">
              <Properties>
                <BasedOn type="string">$ID/NormalParagraphStyle</BasedOn>
              </Properties>
            </ParagraphStyle>
          </RootParagraphStyleGroup>
        </idPkg:Styles>"#};

    #[test]
    fn test_decode_document_keeps_metadata() {
        let document = decode_document(Some(STYLES.as_bytes())).unwrap();
        assert_eq!(document.root().tag(), "Styles");
        assert_eq!(document.root().namespace(), IDPKG_URI);
        assert_eq!(document.metadata().processing_instructions.len(), 1);
        assert_eq!(document.metadata().namespaces["idPkg"], IDPKG_URI);
    }

    #[test]
    fn test_round_trip_is_byte_stable() {
        let document = decode_document(Some(STYLES.as_bytes())).unwrap();
        let encoded = encode_document(&document).unwrap();
        assert_eq!(String::from_utf8(encoded).unwrap(), STYLES);
    }

    #[test]
    fn test_round_trip_is_structurally_equal() {
        let document = decode_document(Some(STYLES.as_bytes())).unwrap();
        let encoded = encode_document(&document).unwrap();
        let again = decode_document(Some(&encoded)).unwrap();
        let diffs = compare(
            Some(document.root()),
            Some(again.root()),
            &CompareOptions::default(),
        );
        assert!(diffs.is_empty(), "{diffs:?}");
        assert_eq!(again.metadata(), document.metadata());
    }

    #[test]
    fn test_prefix_restored_from_default_declaration() {
        // Content produced without its own xmlns:idPkg declaration.
        let root = Element::new("Graphic")
            .with_namespace(IDPKG_URI)
            .with_attribute(Attribute::new("DOMVersion", "20.4"))
            .with_child(Element::new("Color").with_attribute(Attribute::new("Name", "x")));

        let encoded = String::from_utf8(encode(&root, &idpkg_metadata()).unwrap()).unwrap();
        assert_eq!(
            encoded,
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
                 <idPkg:Graphic xmlns:idPkg=\"{}\" DOMVersion=\"20.4\">\n  \
                 <Color xmlns=\"\" Name=\"x\" />\n\
                 </idPkg:Graphic>",
                IDPKG_URI
            )
        );
    }

    fn idpkg_metadata() -> Metadata {
        let mut metadata = Metadata::default();
        metadata
            .namespaces
            .insert("idPkg".to_string(), IDPKG_URI.to_string());
        metadata
    }

    #[test]
    fn test_nested_story_stays_well_formed() {
        let root = Element::new("Story")
            .with_namespace(IDPKG_URI)
            .with_attribute(Attribute::new("DOMVersion", "20.4"))
            .with_child(
                Element::new("Story")
                    .with_attribute(Attribute::new("Self", "u1"))
                    .with_child(Element::new("Content").with_text("hi")),
            );

        let encoded = encode(&root, &idpkg_metadata()).unwrap();
        let text = String::from_utf8(encoded.clone()).unwrap();
        assert!(text.ends_with("  </Story>\n</idPkg:Story>"), "{text}");

        let decoded = decode_document(Some(&encoded)).unwrap();
        let story = decoded.root();
        assert_eq!((story.tag(), story.namespace()), ("Story", IDPKG_URI));
        let inner = &story.children()[0];
        assert_eq!((inner.tag(), inner.namespace()), ("Story", ""));
        assert_eq!(inner.attribute_value("Self"), "u1");
        assert_eq!(inner.child_text("Content"), "hi");
    }

    #[test]
    fn test_descendants_keep_wrapper_namespace() {
        let root = Element::new("Graphic")
            .with_namespace(IDPKG_URI)
            .with_child(Element::new("Inner").with_namespace(IDPKG_URI).with_text("x"))
            .with_child(Element::new("Color"));

        let encoded = encode(&root, &idpkg_metadata()).unwrap();
        let decoded = decode_document(Some(&encoded)).unwrap();
        assert_eq!(decoded.root().children()[0].namespace(), IDPKG_URI);
        assert_eq!(decoded.root().children()[0].text(), "x");
        assert_eq!(decoded.root().children()[1].namespace(), "");
    }

    #[test]
    fn test_encode_without_namespaces_skips_fixups() {
        let root = Element::new("Graphic").with_namespace(IDPKG_URI);
        let metadata = Metadata {
            declaration: Some(r#"version="1.0""#.to_string()),
            processing_instructions: vec![ProcessingInstruction::new("aid", "style=\"50\"")],
            ..Default::default()
        };
        let encoded = String::from_utf8(encode(&root, &metadata).unwrap()).unwrap();
        assert_eq!(
            encoded,
            format!(
                "<?xml version=\"1.0\"?>\n<?aid style=\"50\"?>\n<Graphic xmlns=\"{}\" />",
                IDPKG_URI
            )
        );
    }

    #[test]
    fn test_decode_document_errors() {
        assert!(matches!(decode_document(None), Err(Error::NilInput)));
        assert!(matches!(decode_document(Some(b"")), Err(Error::EmptyInput)));
        match decode_document(Some(b"<?xml version=\"1.0\"?>")).unwrap_err() {
            Error::Parse { context, message } => {
                assert_eq!(context, "decode document");
                assert_eq!(message, "no root element");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    struct Failing;

    impl ToElement for Failing {
        fn to_element(&self) -> Result<Element> {
            Err(Error::Encode("unsupported field".to_string()))
        }
    }

    #[test]
    fn test_encode_propagates_conversion_failure() {
        let err = encode(&Failing, &Metadata::default()).unwrap_err();
        assert_eq!(err.to_string(), "encode error: unsupported field");
    }
}
