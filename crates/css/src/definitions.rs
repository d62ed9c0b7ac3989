//! Built-in property grammars.

use crate::schema::{CssSchema, Property, ValueClasses};
use crate::values::COLOR_NAMES;
use std::sync::LazyLock;

const Q: ValueClasses = ValueClasses::QUANTITY;
const NEG: ValueClasses = ValueClasses::QUANTITY.union(ValueClasses::NEGATIVE);
const HASH: ValueClasses = ValueClasses::HASH_VALUE;
const URL: ValueClasses = ValueClasses::URL;
const NONE: ValueClasses = ValueClasses::empty();

const COLOR_FUNCTIONS: &[(&str, &str)] = &[
    ("rgb", "rgb()"),
    ("rgba", "rgba()"),
    ("hsl", "hsl()"),
    ("hsla", "hsla()"),
];

const IMAGE_FUNCTIONS: &[(&str, &str)] = &[
    ("image", "image()"),
    ("linear-gradient", "linear-gradient()"),
    ("radial-gradient", "radial-gradient()"),
    ("repeating-linear-gradient", "linear-gradient()"),
    ("repeating-radial-gradient", "radial-gradient()"),
];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const BORDER_WIDTHS: &[&str] = &["thin", "medium", "thick"];
const FONT_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
    "larger", "smaller",
];
const FONT_STYLES: &[&str] = &["normal", "italic", "oblique"];
const FONT_VARIANTS: &[&str] = &["normal", "small-caps"];
const FONT_WEIGHTS: &[&str] = &[
    "normal", "bold", "bolder", "lighter", "100", "200", "300", "400", "500", "600", "700", "800",
    "900",
];
const FONT_STRETCHES: &[&str] = &[
    "normal",
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];
const GENERIC_FAMILIES: &[&str] = &[
    "serif", "sans-serif", "monospace", "cursive", "fantasy", "system-ui",
];
const SYSTEM_FONTS: &[&str] = &[
    "caption", "icon", "menu", "message-box", "small-caption", "status-bar",
];
const SIDES: &[&str] = &["left", "right", "top", "bottom", "center"];
const REPEATS: &[&str] = &["repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round"];
const ATTACHMENTS: &[&str] = &["scroll", "fixed", "local"];
const BOXES: &[&str] = &["border-box", "padding-box", "content-box"];
const LIST_TYPES: &[&str] = &[
    "none",
    "disc",
    "circle",
    "square",
    "decimal",
    "decimal-leading-zero",
    "lower-roman",
    "upper-roman",
    "lower-greek",
    "lower-alpha",
    "lower-latin",
    "upper-alpha",
    "upper-latin",
    "armenian",
    "georgian",
];
const LIST_POSITIONS: &[&str] = &["inside", "outside"];
const OVERFLOWS: &[&str] = &["visible", "hidden", "clip", "scroll", "auto"];
const SIZES: &[&str] = &["auto", "max-content", "min-content", "fit-content"];

/// Properties enabled by plain `allow_styling()`.
pub(crate) const DEFAULT_WHITELIST: &[&str] = &[
    "background",
    "background-attachment",
    "background-color",
    "background-image",
    "background-position",
    "background-repeat",
    "background-size",
    "border",
    "border-bottom",
    "border-bottom-color",
    "border-bottom-left-radius",
    "border-bottom-right-radius",
    "border-bottom-style",
    "border-bottom-width",
    "border-collapse",
    "border-color",
    "border-left",
    "border-left-color",
    "border-left-style",
    "border-left-width",
    "border-radius",
    "border-right",
    "border-right-color",
    "border-right-style",
    "border-right-width",
    "border-spacing",
    "border-style",
    "border-top",
    "border-top-color",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-top-style",
    "border-top-width",
    "border-width",
    "box-shadow",
    "caption-side",
    "color",
    "direction",
    "empty-cells",
    "font",
    "font-family",
    "font-size",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "height",
    "letter-spacing",
    "line-height",
    "list-style",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "margin",
    "margin-bottom",
    "margin-left",
    "margin-right",
    "margin-top",
    "max-height",
    "max-width",
    "min-height",
    "min-width",
    "outline",
    "outline-color",
    "outline-style",
    "outline-width",
    "padding",
    "padding-bottom",
    "padding-left",
    "padding-right",
    "padding-top",
    "quotes",
    "table-layout",
    "text-align",
    "text-decoration",
    "text-indent",
    "text-overflow",
    "text-shadow",
    "text-transform",
    "text-wrap",
    "unicode-bidi",
    "vertical-align",
    "white-space",
    "width",
    "word-spacing",
    "word-wrap",
];

static DEFINITIONS: LazyLock<CssSchema> = LazyLock::new(build);

pub(crate) fn definitions() -> &'static CssSchema {
    &DEFINITIONS
}

struct Table(Vec<(String, Property)>);

impl Table {
    fn define(
        &mut self,
        names: &[&str],
        classes: ValueClasses,
        literals: &[&[&str]],
        functions: &[&[(&str, &str)]],
    ) {
        let property = Property::new(
            classes,
            literals.iter().flat_map(|group| group.iter()),
            functions.iter().flat_map(|group| group.iter().copied()),
        );
        for name in names {
            self.0.push((name.to_string(), property.clone()));
        }
    }
}

fn build() -> CssSchema {
    let mut t = Table(Vec::new());
    let colors: &[&str] = COLOR_NAMES;

    // Function argument grammars.
    t.define(&["rgb()", "rgba()", "hsl()", "hsla()"], Q, &[&["none"]], &[]);
    t.define(&["image()"], URL | HASH, &[colors], &[COLOR_FUNCTIONS]);
    t.define(
        &["linear-gradient()"],
        NEG | HASH,
        &[colors, SIDES, &["to"]],
        &[COLOR_FUNCTIONS],
    );
    t.define(
        &["radial-gradient()"],
        NEG | HASH,
        &[
            colors,
            SIDES,
            &[
                "at",
                "circle",
                "ellipse",
                "closest-side",
                "closest-corner",
                "farthest-side",
                "farthest-corner",
            ],
        ],
        &[COLOR_FUNCTIONS],
    );

    // Colors.
    t.define(
        &[
            "color",
            "background-color",
            "border-color",
            "border-top-color",
            "border-right-color",
            "border-bottom-color",
            "border-left-color",
            "outline-color",
            "text-decoration-color",
        ],
        HASH,
        &[colors],
        &[COLOR_FUNCTIONS],
    );

    // Box model.
    t.define(
        &["margin", "margin-top", "margin-right", "margin-bottom", "margin-left"],
        NEG,
        &[&["auto"]],
        &[],
    );
    t.define(
        &["padding", "padding-top", "padding-right", "padding-bottom", "padding-left"],
        Q,
        &[],
        &[],
    );
    t.define(&["width", "height"], Q, &[SIZES], &[]);
    t.define(&["min-width", "min-height"], Q, &[SIZES], &[]);
    t.define(&["max-width", "max-height"], Q, &[SIZES, &["none"]], &[]);

    // Borders.
    t.define(
        &["border", "border-top", "border-right", "border-bottom", "border-left", "outline"],
        Q | HASH,
        &[BORDER_STYLES, BORDER_WIDTHS, colors],
        &[COLOR_FUNCTIONS],
    );
    t.define(
        &[
            "border-style",
            "border-top-style",
            "border-right-style",
            "border-bottom-style",
            "border-left-style",
            "outline-style",
        ],
        NONE,
        &[BORDER_STYLES],
        &[],
    );
    t.define(
        &[
            "border-width",
            "border-top-width",
            "border-right-width",
            "border-bottom-width",
            "border-left-width",
            "outline-width",
        ],
        Q,
        &[BORDER_WIDTHS],
        &[],
    );
    t.define(
        &[
            "border-radius",
            "border-top-left-radius",
            "border-top-right-radius",
            "border-bottom-left-radius",
            "border-bottom-right-radius",
            "border-spacing",
        ],
        Q,
        &[],
        &[],
    );
    t.define(&["border-collapse"], NONE, &[&["collapse", "separate"]], &[]);

    // Backgrounds.
    t.define(&["background-image"], URL, &[&["none"]], &[IMAGE_FUNCTIONS]);
    t.define(&["background-repeat"], NONE, &[REPEATS], &[]);
    t.define(&["background-attachment"], NONE, &[ATTACHMENTS], &[]);
    t.define(&["background-position"], NEG, &[SIDES], &[]);
    t.define(&["background-size"], Q, &[&["auto", "cover", "contain"]], &[]);
    t.define(
        &["background"],
        URL | NEG | HASH,
        &[colors, REPEATS, ATTACHMENTS, SIDES, BOXES, &["none", "auto", "cover", "contain"]],
        &[COLOR_FUNCTIONS, IMAGE_FUNCTIONS],
    );

    // Fonts.
    t.define(
        &["font-family"],
        ValueClasses::STRING | ValueClasses::UNRESERVED_WORD,
        &[GENERIC_FAMILIES],
        &[],
    );
    t.define(&["font-size"], Q, &[FONT_SIZES], &[]);
    t.define(&["font-style"], NONE, &[FONT_STYLES], &[]);
    t.define(&["font-variant"], NONE, &[FONT_VARIANTS], &[]);
    t.define(&["font-weight"], NONE, &[FONT_WEIGHTS], &[]);
    t.define(&["font-stretch"], NONE, &[FONT_STRETCHES], &[]);
    t.define(
        &["font"],
        Q | ValueClasses::STRING | ValueClasses::UNRESERVED_WORD,
        &[
            FONT_STYLES,
            FONT_VARIANTS,
            FONT_WEIGHTS,
            FONT_SIZES,
            FONT_STRETCHES,
            GENERIC_FAMILIES,
            SYSTEM_FONTS,
        ],
        &[],
    );

    // Text.
    t.define(
        &["text-align"],
        NONE,
        &[&["left", "right", "center", "justify", "start", "end"]],
        &[],
    );
    t.define(
        &["text-align-last"],
        NONE,
        &[&["auto", "left", "right", "center", "justify", "start", "end"]],
        &[],
    );
    t.define(
        &["text-decoration"],
        HASH,
        &[
            &["none", "underline", "overline", "line-through", "blink"],
            BORDER_STYLES,
            colors,
        ],
        &[COLOR_FUNCTIONS],
    );
    t.define(
        &["text-transform"],
        NONE,
        &[&["none", "capitalize", "uppercase", "lowercase"]],
        &[],
    );
    t.define(&["text-overflow"], NONE, &[&["clip", "ellipsis"]], &[]);
    t.define(
        &["text-wrap"],
        NONE,
        &[&["wrap", "nowrap", "balance", "pretty", "stable"]],
        &[],
    );
    t.define(&["text-indent"], NEG, &[], &[]);
    t.define(
        &["text-shadow", "box-shadow"],
        NEG | HASH,
        &[colors, &["none", "inset"]],
        &[COLOR_FUNCTIONS],
    );
    t.define(&["letter-spacing", "word-spacing"], NEG, &[&["normal"]], &[]);
    t.define(&["line-height"], Q, &[&["normal"]], &[]);
    t.define(
        &["vertical-align"],
        NEG,
        &[&[
            "baseline",
            "sub",
            "super",
            "text-top",
            "text-bottom",
            "middle",
            "top",
            "bottom",
        ]],
        &[],
    );
    t.define(
        &["white-space"],
        NONE,
        &[&["normal", "pre", "nowrap", "pre-wrap", "pre-line", "break-spaces"]],
        &[],
    );
    t.define(
        &["word-wrap", "overflow-wrap"],
        NONE,
        &[&["normal", "break-word", "anywhere"]],
        &[],
    );
    t.define(
        &["word-break"],
        NONE,
        &[&["normal", "break-all", "keep-all", "break-word"]],
        &[],
    );
    t.define(&["hyphens"], NONE, &[&["none", "manual", "auto"]], &[]);
    t.define(&["direction"], NONE, &[&["ltr", "rtl"]], &[]);
    t.define(
        &["unicode-bidi"],
        NONE,
        &[&[
            "normal",
            "embed",
            "bidi-override",
            "isolate",
            "isolate-override",
            "plaintext",
        ]],
        &[],
    );
    t.define(
        &["quotes"],
        ValueClasses::STRING,
        &[&["none", "auto"]],
        &[],
    );

    // Lists and tables.
    t.define(&["list-style-type"], NONE, &[LIST_TYPES], &[]);
    t.define(&["list-style-position"], NONE, &[LIST_POSITIONS], &[]);
    t.define(&["list-style-image"], URL, &[&["none"]], &[]);
    t.define(&["list-style"], URL, &[LIST_TYPES, LIST_POSITIONS], &[]);
    t.define(&["caption-side"], NONE, &[&["top", "bottom"]], &[]);
    t.define(&["empty-cells"], NONE, &[&["show", "hide"]], &[]);
    t.define(&["table-layout"], NONE, &[&["auto", "fixed"]], &[]);

    // Layout; available through explicit schemas only.
    t.define(
        &["display"],
        NONE,
        &[&[
            "none",
            "block",
            "inline",
            "inline-block",
            "flex",
            "inline-flex",
            "grid",
            "inline-grid",
            "flow-root",
            "list-item",
            "contents",
            "table",
            "table-row",
            "table-cell",
        ]],
        &[],
    );
    t.define(
        &["float"],
        NONE,
        &[&["left", "right", "none", "inline-start", "inline-end"]],
        &[],
    );
    t.define(&["clear"], NONE, &[&["left", "right", "both", "none"]], &[]);
    t.define(&["overflow", "overflow-x", "overflow-y"], NONE, &[OVERFLOWS], &[]);
    t.define(&["visibility"], NONE, &[&["visible", "hidden", "collapse"]], &[]);
    t.define(&["opacity"], Q, &[], &[]);
    t.define(
        &["cursor"],
        NONE,
        &[&[
            "auto",
            "default",
            "pointer",
            "text",
            "move",
            "help",
            "wait",
            "progress",
            "crosshair",
            "not-allowed",
        ]],
        &[],
    );

    CssSchema::from_properties(t.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_property_is_defined() {
        for name in DEFAULT_WHITELIST {
            assert!(definitions().get(name).is_some(), "{name} has no definition");
        }
    }

    #[test]
    fn every_function_key_resolves() {
        for name in definitions().property_names() {
            let property = definitions().get(name).unwrap();
            for key in property.functions.values() {
                assert!(definitions().get(key).is_some(), "{name} references {key}");
            }
        }
    }

    #[test]
    fn layout_properties_are_opt_in() {
        for name in ["display", "float", "clear", "overflow", "overflow-wrap"] {
            assert!(definitions().get(name).is_some());
            assert!(!DEFAULT_WHITELIST.contains(&name));
        }
    }
}
