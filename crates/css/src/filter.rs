use crate::schema::{CssSchema, Property, ValueClasses};
use crate::syntax::parse_declarations;
use crate::tokens::CssToken;
use crate::values::{
    CSS_WIDE_KEYWORDS, is_hex_color, is_known_unit, is_negative, is_unreserved_word, quote_string,
    quote_url,
};
use log::debug;

/// Callback deciding whether a URL found in a style may be kept, returning
/// the (possibly rewritten) URL to emit.
pub type UrlFilter<'a> = &'a dyn Fn(&str) -> Option<String>;

const MAX_FUNCTION_DEPTH: usize = 8;

// input: "color: red; position: fixed; width: 10PX !important"
// output: "color:red;width:10px"
//
// Declarations whose property is not in `schema`, or whose value contains
// anything the property's grammar does not accept, are dropped whole.
// Without a `urls` filter every URL is rejected.
pub fn sanitize_style(style: &str, schema: &CssSchema, urls: Option<UrlFilter<'_>>) -> String {
    let mut out = String::new();
    for declaration in parse_declarations(style) {
        let property = match schema.get(&declaration.name) {
            Some(property) if !declaration.name.ends_with("()") => property,
            _ => {
                debug!(target: "css.filter", "drop property {}", declaration.name);
                continue;
            }
        };
        let filter = ValueFilter { schema, urls };
        match filter.value(&declaration.value, property) {
            Some(value) => {
                if !out.is_empty() {
                    out.push(';');
                }
                out.push_str(&declaration.name);
                out.push(':');
                out.push_str(&value);
            }
            None => debug!(target: "css.filter", "drop value of {}", declaration.name),
        }
    }
    out
}

struct ValueFilter<'s, 'u> {
    schema: &'s CssSchema,
    urls: Option<UrlFilter<'u>>,
}

impl ValueFilter<'_, '_> {
    fn value(&self, tokens: &[CssToken], property: &Property) -> Option<String> {
        let tokens: Vec<&CssToken> = tokens
            .iter()
            .filter(|token| **token != CssToken::Whitespace)
            .collect();
        if let [CssToken::Ident(word)] = tokens.as_slice() {
            let lower = word.to_ascii_lowercase();
            if CSS_WIDE_KEYWORDS.contains(&lower.as_str()) {
                return Some(lower);
            }
        }
        let parts = self.parts(&tokens, property, 0)?;
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn parts(
        &self,
        tokens: &[&CssToken],
        property: &Property,
        depth: usize,
    ) -> Option<Vec<String>> {
        let classes = property.classes;
        let mut parts = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let part = match tokens[i] {
                CssToken::Ident(word) => {
                    let lower = word.to_ascii_lowercase();
                    if property.literals.contains(&lower) {
                        lower
                    } else if classes.contains(ValueClasses::UNRESERVED_WORD)
                        && is_unreserved_word(word)
                    {
                        word.clone()
                    } else {
                        return None;
                    }
                }
                CssToken::Number(repr) => {
                    if property.literals.contains(repr) {
                        repr.clone()
                    } else {
                        quantity(classes, repr)?;
                        repr.clone()
                    }
                }
                CssToken::Percentage(repr) => {
                    quantity(classes, repr)?;
                    format!("{repr}%")
                }
                CssToken::Dimension(repr, unit) => {
                    let unit = unit.to_ascii_lowercase();
                    if !is_known_unit(&unit) {
                        return None;
                    }
                    quantity(classes, repr)?;
                    format!("{repr}{unit}")
                }
                CssToken::Hash(hash) => {
                    if !classes.contains(ValueClasses::HASH_VALUE) || !is_hex_color(hash) {
                        return None;
                    }
                    format!("#{}", hash.to_ascii_lowercase())
                }
                CssToken::String(value) => {
                    if classes.contains(ValueClasses::URL) {
                        self.url(value)?
                    } else if classes.contains(ValueClasses::STRING) {
                        quote_string(value)
                    } else {
                        return None;
                    }
                }
                CssToken::Url(value) => {
                    if !classes.contains(ValueClasses::URL) {
                        return None;
                    }
                    self.url(value)?
                }
                CssToken::UnicodeRange(range) => {
                    if !classes.contains(ValueClasses::UNICODE_RANGE) {
                        return None;
                    }
                    range.to_ascii_lowercase()
                }
                CssToken::Function(name) => {
                    let close = matching_close(tokens, i);
                    let args = &tokens[i + 1..close];
                    i = close;
                    self.function(name, args, property, depth)?
                }
                CssToken::Comma => ",".to_string(),
                CssToken::Delim('/') => "/".to_string(),
                _ => return None,
            };
            parts.push(part);
            i += 1;
        }
        Some(parts)
    }

    fn function(
        &self,
        name: &str,
        args: &[&CssToken],
        property: &Property,
        depth: usize,
    ) -> Option<String> {
        let name = name.to_ascii_lowercase();
        if name == "url" {
            if !property.classes.contains(ValueClasses::URL) {
                return None;
            }
            return match args {
                [CssToken::String(value)] => self.url(value),
                _ => None,
            };
        }
        if depth >= MAX_FUNCTION_DEPTH {
            return None;
        }
        let key = property.functions.get(&name)?;
        let grammar = self.schema.get(key)?;
        let inner = self.parts(args, grammar, depth + 1)?;
        if inner.is_empty() {
            return Some(format!("{name}()"));
        }
        Some(format!("{name}( {} )", inner.join(" ")))
    }

    fn url(&self, value: &str) -> Option<String> {
        let filter = self.urls?;
        let accepted = filter(value)?;
        Some(quote_url(&accepted))
    }
}

fn quantity(classes: ValueClasses, repr: &str) -> Option<()> {
    if !classes.contains(ValueClasses::QUANTITY) {
        return None;
    }
    if is_negative(repr) && !classes.contains(ValueClasses::NEGATIVE) {
        return None;
    }
    Some(())
}

/// Index of the `)` closing the function opened at `open`, or the end of
/// `tokens` when the function is unterminated.
fn matching_close(tokens: &[&CssToken], open: usize) -> usize {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if token.opens_block() {
            depth += 1;
        } else if matches!(token, CssToken::CloseParen | CssToken::CloseBracket) {
            depth -= 1;
            if depth == 0 {
                return index;
            }
        }
    }
    tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    fn allow_all(url: &str) -> Option<String> {
        Some(url.to_string())
    }

    fn no_javascript(url: &str) -> Option<String> {
        (!url.to_ascii_lowercase().starts_with("javascript:")).then(|| url.to_string())
    }

    fn sanitize(style: &str) -> String {
        sanitize_style(style, CssSchema::default_whitelist(), None)
    }

    #[test]
    fn keeps_whitelisted_declarations() {
        assert_eq!(
            sanitize("color: red; position: fixed; width: 10PX !important"),
            "color:red;width:10px"
        );
    }

    #[test]
    fn drops_whole_declaration_on_bad_token() {
        assert_eq!(sanitize("color: red expression(alert(1)); font-size: 12px"), "font-size:12px");
        assert_eq!(sanitize("width: 10furlongs"), "");
        assert_eq!(sanitize("color: #ggg"), "");
    }

    #[test]
    fn negative_quantities_need_permission() {
        assert_eq!(sanitize("margin-left: -4px; padding-left: -4px"), "margin-left:-4px");
    }

    #[test]
    fn css_wide_keywords_are_always_allowed() {
        assert_eq!(sanitize("color: INHERIT; font-size: unset"), "color:inherit;font-size:unset");
        assert_eq!(sanitize("color: red inherit"), "");
    }

    #[test]
    fn color_functions_serialize_with_spaced_arguments() {
        assert_eq!(
            sanitize("color: RGB(255, 0,0); border-left-color: #F00"),
            "color:rgb( 255 , 0 , 0 );border-left-color:#f00"
        );
    }

    #[test]
    fn font_family_strings_and_words() {
        assert_eq!(
            sanitize("font-family: 'Arial Black', Helvetica, sans-serif"),
            "font-family:'Arial Black' , Helvetica , sans-serif"
        );
        assert_eq!(sanitize(r"font-family: a\22 b"), "");
    }

    #[test]
    fn urls_need_a_filter() {
        assert_eq!(sanitize("background-image: url(http://example.com/foo.png)"), "");
        let schema = CssSchema::default_whitelist();
        assert_eq!(
            sanitize_style(
                "background-image: url(http://example.com/foo.png)",
                schema,
                Some(&allow_all)
            ),
            "background-image:url('http://example.com/foo.png')"
        );
        assert_eq!(
            sanitize_style("background: url('javascript:alert(1)')", schema, Some(&no_javascript)),
            ""
        );
    }

    #[test]
    fn strings_in_url_properties_are_urls() {
        let schema = CssSchema::default_whitelist();
        assert_eq!(
            sanitize_style(
                "background-image: image(\"blue sky.png\", blue)",
                schema,
                Some(&allow_all)
            ),
            "background-image:image( url('blue%20sky.png') , blue )"
        );
    }

    #[test]
    fn custom_property_grammar() {
        let schema = CssSchema::from_properties([(
            "text-align",
            Property::new(ValueClasses::empty(), ["center"], [] as [(&str, &str); 0]),
        )]);
        assert_eq!(
            sanitize_style("text-align: center; text-align: left", &schema, None),
            "text-align:center"
        );
    }

    #[test]
    fn escaped_declarations_and_braces() {
        assert_eq!(sanitize(r"col\6fr: red"), "color:red");
        assert_eq!(sanitize("}color:red;{width:1px"), "color:red;width:1px");
    }

    #[test]
    fn deep_function_nesting_is_rejected() {
        let schema = CssSchema::from_properties([
            (
                "x",
                Property::new(ValueClasses::empty(), [] as [&str; 0], [("f", "f()")]),
            ),
            (
                "f()",
                Property::new(ValueClasses::QUANTITY, [] as [&str; 0], [("f", "f()")]),
            ),
        ]);
        assert_eq!(sanitize_style("x: f(f(1))", &schema, None), "x:f( f( 1 ) )");
        let deep = format!("x: {}1{}", "f(".repeat(40), ")".repeat(40));
        assert_eq!(sanitize_style(&deep, &schema, None), "");
    }
}
