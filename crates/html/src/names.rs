//! Canonical tag and attribute names plus element categories.
//!
//! Invariant: canonical names are ASCII-lowercase, except for the SVG/MathML
//! names whose identity is mixed-case. A lowercase spelling of such a name
//! maps to its mixed-case form unless it is also an HTML name (`textarea`
//! stays `textarea`; only an exact `textArea` denotes the SVG element).

use std::collections::HashMap;
use std::sync::LazyLock;

const MIXED_CASE_ELEMENTS: &[&str] = &[
    "altGlyph",
    "altGlyphDef",
    "altGlyphItem",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "clipPath",
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feDistantLight",
    "feDropShadow",
    "feFlood",
    "feFuncA",
    "feFuncB",
    "feFuncG",
    "feFuncR",
    "feGaussianBlur",
    "feImage",
    "feMerge",
    "feMergeNode",
    "feMorphology",
    "feOffset",
    "fePointLight",
    "feSpecularLighting",
    "feSpotLight",
    "feTile",
    "feTurbulence",
    "foreignObject",
    "glyphRef",
    "linearGradient",
    "radialGradient",
    "textArea",
    "textPath",
];

const MIXED_CASE_ATTRIBUTES: &[&str] = &[
    "attributeName",
    "attributeType",
    "baseFrequency",
    "baseProfile",
    "calcMode",
    "clipPathUnits",
    "definitionURL",
    "diffuseConstant",
    "edgeMode",
    "filterUnits",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "kernelMatrix",
    "kernelUnitLength",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lengthAdjust",
    "limitingConeAngle",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "maskContentUnits",
    "maskUnits",
    "numOctaves",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "refX",
    "refY",
    "repeatCount",
    "repeatDur",
    "requiredExtensions",
    "requiredFeatures",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "surfaceScale",
    "systemLanguage",
    "tableValues",
    "targetX",
    "targetY",
    "textLength",
    "viewBox",
    "viewTarget",
    "xChannelSelector",
    "yChannelSelector",
    "zoomAndPan",
];

/// Lowercase spellings that already name an HTML element.
const HTML_COLLISIONS: &[&str] = &["textarea"];

struct MixedCaseNames {
    exact: &'static [&'static str],
    by_folded: HashMap<String, &'static str>,
}

impl MixedCaseNames {
    fn new(exact: &'static [&'static str]) -> Self {
        let by_folded = exact
            .iter()
            .map(|name| (name.to_ascii_lowercase(), *name))
            .filter(|(folded, _)| !HTML_COLLISIONS.contains(&folded.as_str()))
            .collect();
        Self { exact, by_folded }
    }

    fn canonicalize(&self, raw: &str) -> String {
        if self.exact.contains(&raw) {
            return raw.to_string();
        }
        let folded = raw.to_ascii_lowercase();
        match self.by_folded.get(&folded) {
            Some(mixed) => (*mixed).to_string(),
            None => folded,
        }
    }
}

static ELEMENTS: LazyLock<MixedCaseNames> =
    LazyLock::new(|| MixedCaseNames::new(MIXED_CASE_ELEMENTS));
static ATTRIBUTES: LazyLock<MixedCaseNames> =
    LazyLock::new(|| MixedCaseNames::new(MIXED_CASE_ATTRIBUTES));

/// Canonical element name for a raw tag name as written in markup.
pub fn canonical_element_name(raw: &str) -> String {
    ELEMENTS.canonicalize(raw)
}

/// Canonical attribute name for a raw attribute name as written in markup.
pub fn canonical_attribute_name(raw: &str) -> String {
    ATTRIBUTES.canonicalize(raw)
}

/// Elements that never have content or a close tag.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "embed"
            | "frame"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// How the content of an element is lexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    /// Ordinary markup.
    Markup,
    /// Raw text: no tags and no character references until the close tag.
    RawText,
    /// Escapable raw text: no tags, but character references are decoded.
    EscapableRawText,
    /// Everything up to the end of the input is raw text.
    Plaintext,
}

pub fn text_kind(name: &str) -> TextKind {
    match name {
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" => TextKind::RawText,
        "textarea" | "title" => TextKind::EscapableRawText,
        "plaintext" => TextKind::Plaintext,
        _ => TextKind::Markup,
    }
}

/// Whether `name` can be written as an element name without changing meaning.
pub fn is_valid_element_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
}

/// Whether `name` can be written as an attribute name without changing meaning.
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'_' | b':'))
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_names_fold_to_lowercase() {
        assert_eq!(canonical_element_name("DIV"), "div");
        assert_eq!(canonical_element_name("TextArea"), "textarea");
        assert_eq!(canonical_attribute_name("HREF"), "href");
    }

    #[test]
    fn mixed_case_foreign_names_keep_their_identity() {
        assert_eq!(canonical_element_name("textArea"), "textArea");
        assert_eq!(canonical_element_name("CLIPPATH"), "clipPath");
        assert_eq!(canonical_element_name("foreignobject"), "foreignObject");
        assert_eq!(canonical_attribute_name("viewbox"), "viewBox");
        assert_eq!(canonical_attribute_name("viewBox"), "viewBox");
    }

    #[test]
    fn name_validity() {
        assert!(is_valid_element_name("h1"));
        assert!(is_valid_element_name("svg:rect"));
        assert!(!is_valid_element_name("1h"));
        assert!(!is_valid_element_name("a\"b"));
        assert!(!is_valid_element_name(""));
        assert!(is_valid_attribute_name("data-x"));
        assert!(is_valid_attribute_name("xlink:href"));
        assert!(!is_valid_attribute_name("on click"));
        assert!(!is_valid_attribute_name("a=b"));
    }

    #[test]
    fn text_kinds() {
        assert_eq!(text_kind("script"), TextKind::RawText);
        assert_eq!(text_kind("textarea"), TextKind::EscapableRawText);
        assert_eq!(text_kind("textArea"), TextKind::Markup);
        assert_eq!(text_kind("noscript"), TextKind::Markup);
        assert_eq!(text_kind("plaintext"), TextKind::Plaintext);
    }
}
