//! Constants shared by the codec, the printer and the comparator.

/// Prefix bound to the IDML packaging namespace.
pub const IDPKG_PREFIX: &str = "idPkg";

/// Namespace URI of the IDML packaging wrapper elements.
pub const IDPKG_URI: &str = "http://ns.adobe.com/AdobeInDesign/idml/1.0/packaging";

/// Attribute carrying the schema version on wrapper elements.
pub const DOM_VERSION_ATTR: &str = "DOMVersion";

/// Declaration attributes emitted when the source had none.
pub const DEFAULT_DECLARATION: &str = r#"version="1.0" encoding="UTF-8" standalone="yes""#;

/// Wrapper element names whose closing tags are repaired after a
/// default-namespace rewrite. Kept as a fixed list on purpose.
pub const WRAPPED_ELEMENTS: &[&str] = &[
    "Graphic",
    "Fonts",
    "Styles",
    "Preferences",
    "Tags",
    "MasterSpread",
    "Spread",
    "Story",
    "BackingStory",
    "Mapping",
];

/// Tags whose children are compared order-insensitively by default.
pub const DEFAULT_UNORDERED_TAGS: &[&str] = &[
    "FontFamily",
    "Color",
    "ParagraphStyle",
    "CharacterStyle",
    "ObjectStyle",
];

/// Default ceiling on collected differences.
pub const DEFAULT_MAX_DIFFERENCES: usize = 100;

/// Text values in difference records are cut to this many characters.
pub const TEXT_TRUNCATE_LIMIT: usize = 100;

/// Marker appended to truncated text values.
pub const TRUNCATION_MARKER: &str = "...";

/// Indentation unit used by the printer.
pub const DEFAULT_INDENT: &str = "  ";

/// Namespace recorded on attributes that declare a prefix (`xmlns:p`).
pub const XMLNS_NAMESPACE: &str = "xmlns";

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
