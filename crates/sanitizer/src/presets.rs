//! Canned rule bundles for common rich-text needs.
//!
//! Presets add to a builder, so several of them union:
//!
//! ```
//! use sanitizer::{PolicyBuilder, Preset};
//!
//! let policy = PolicyBuilder::new()
//!     .allow_preset(Preset::Formatting)
//!     .allow_preset(Preset::Links)
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     policy.sanitize("<b><a href='http://x/'>x</a></b><img src=y>"),
//!     r#"<b><a href="http://x/" rel="nofollow">x</a></b>"#
//! );
//! ```

use crate::builder::PolicyBuilder;
use serde::Deserialize;

const TABLE_ELEMENTS: &[&str] = &[
    "table", "tr", "td", "th", "colgroup", "caption", "col", "thead", "tbody", "tfoot",
];

const INTEGER: &str = "[0-9]+";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Common inline formatting: `b`, `i`, `em`, `span`, ...
    Formatting,
    /// Paragraphs, headings, lists and block quotes.
    Blocks,
    /// `style` attributes filtered through the default CSS whitelist.
    Styles,
    /// `a href` with the standard protocols and `rel="nofollow"`.
    Links,
    /// Table structure with alignment attributes.
    Tables,
    /// `img` with `alt`, `src` and integer dimensions.
    Images,
}

impl Preset {
    pub fn apply(self, builder: PolicyBuilder) -> PolicyBuilder {
        match self {
            Preset::Formatting => builder.allow_common_inline_formatting_elements(),
            Preset::Blocks => builder.allow_common_block_elements(),
            Preset::Styles => builder.allow_styling(),
            Preset::Links => builder
                .allow_standard_url_protocols()
                .allow_elements(["a"])
                .allow_attributes(["href"])
                .on_elements(["a"])
                .require_rel_nofollow_on_links(),
            Preset::Tables => builder
                .allow_elements(TABLE_ELEMENTS)
                .allow_attributes(["summary"])
                .on_elements(["table"])
                .allow_attributes(["align", "valign"])
                .on_elements(TABLE_ELEMENTS),
            Preset::Images => builder
                .allow_url_protocols(["http", "https"])
                .allow_elements(["img"])
                .allow_attributes(["alt", "src"])
                .on_elements(["img"])
                .allow_attributes(["border", "height", "width"])
                .matching_regex(INTEGER)
                .on_elements(["img"]),
        }
    }
}

impl PolicyBuilder {
    pub fn allow_preset(self, preset: Preset) -> Self {
        preset.apply(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(presets: &[Preset]) -> crate::Policy {
        presets
            .iter()
            .fold(PolicyBuilder::new(), |builder, preset| builder.allow_preset(*preset))
            .build()
            .unwrap()
    }

    #[test]
    fn tables_repair_missing_structure() {
        let input = "<TABLE>\
                     <TR><TD>Foo<TD>Bar\
                     <TR><TH>Baz<TH>Boo<TH>Far<TH>Faz\
                     <TR><TD>Oink<TD>Doink<TD>Poink<TD>Toink";
        assert_eq!(
            policy(&[Preset::Tables]).sanitize(input),
            "<table><tbody>\
             <tr><td>Foo</td><td>Bar</td></tr>\
             <tr><th>Baz</th><th>Boo</th><th>Far</th><th>Faz</th></tr>\
             <tr><td>Oink</td><td>Doink</td><td>Poink</td><td>Toink</td></tr>\
             </tbody></table>"
        );
    }

    #[test]
    fn images_keep_integer_dimensions_only() {
        assert_eq!(
            policy(&[Preset::Images]).sanitize(
                "<img src='https://x/a.png' width=10 height='10px' onerror=f() alt=a>"
            ),
            r#"<img src="https://x/a.png" width="10" alt="a" />"#
        );
        assert_eq!(policy(&[Preset::Images]).sanitize("<img src='ftp://x/'>"), "");
    }

    #[test]
    fn presets_union() {
        let both = policy(&[Preset::Blocks, Preset::Styles]);
        assert_eq!(
            both.sanitize("<p style='color: red'>x</p><b>y</b>"),
            r#"<p style="color:red">x</p>y"#
        );
    }
}
