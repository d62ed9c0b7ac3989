use crate::tokens::{CssToken, tokenize};

// A single CSS property: "color: red"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Value tokens with surrounding whitespace and `!important` removed;
    /// sanitized output never carries the priority.
    pub value: Vec<CssToken>,
}

// input: "color: red; FONT-SIZE: 12px !important"
// output: [Declaration { name: "color", .. }, Declaration { name: "font-size", .. }]
//
// Declarations end at a top-level `;`. Braces also end the current
// declaration so that `a{color:red}` recovers the `color` declaration the
// way a browser recovers from a stray block in a style attribute.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    let tokens = tokenize(input);
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for token in tokens {
        match token {
            CssToken::Semicolon if depth == 0 => {
                out.extend(parse_declaration(std::mem::take(&mut current)));
            }
            CssToken::OpenBrace | CssToken::CloseBrace => {
                out.extend(parse_declaration(std::mem::take(&mut current)));
                depth = 0;
            }
            _ => {
                if token.opens_block() {
                    depth += 1;
                } else if matches!(token, CssToken::CloseParen | CssToken::CloseBracket) {
                    depth = depth.saturating_sub(1);
                }
                current.push(token);
            }
        }
    }
    out.extend(parse_declaration(current));
    out
}

// input: [Ident("color"), Colon, Whitespace, Ident("red")]
// output: Some(Declaration { name: "color", value: [Ident("red")] })
fn parse_declaration(tokens: Vec<CssToken>) -> Option<Declaration> {
    let mut iter = tokens
        .into_iter()
        .skip_while(|token| *token == CssToken::Whitespace);
    let CssToken::Ident(name) = iter.next()? else {
        return None;
    };
    let mut iter = iter.skip_while(|token| *token == CssToken::Whitespace);
    if iter.next()? != CssToken::Colon {
        return None;
    }
    let mut value: Vec<CssToken> = iter.collect();
    trim_whitespace(&mut value);
    strip_important(&mut value);
    Some(Declaration {
        name: name.to_ascii_lowercase(),
        value,
    })
}

fn trim_whitespace(value: &mut Vec<CssToken>) {
    while value.last() == Some(&CssToken::Whitespace) {
        value.pop();
    }
    let leading = value
        .iter()
        .take_while(|token| **token == CssToken::Whitespace)
        .count();
    value.drain(..leading);
}

fn strip_important(value: &mut Vec<CssToken>) {
    let Some(CssToken::Ident(word)) = value.last() else {
        return;
    };
    if !word.eq_ignore_ascii_case("important") {
        return;
    }
    let bang = value[..value.len() - 1]
        .iter()
        .rposition(|token| *token != CssToken::Whitespace);
    match bang {
        Some(index) if value[index] == CssToken::Delim('!') => {
            value.truncate(index);
            trim_whitespace(value);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(input: &str) -> Vec<String> {
        parse_declarations(input).into_iter().map(|d| d.name).collect()
    }

    #[test]
    fn splits_on_semicolons_and_lowercases_names() {
        assert_eq!(names("COLOR: red;; font-size:12px;"), vec!["color", "font-size"]);
    }

    #[test]
    fn semicolon_inside_function_does_not_split() {
        let decls = parse_declarations("background: image(a;b); color: red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].name, "color");
    }

    #[test]
    fn braces_end_declarations() {
        assert_eq!(names("a{color:red}b{width:1px"), vec!["color", "width"]);
    }

    #[test]
    fn missing_colon_or_name_is_skipped() {
        assert_eq!(names("color red; :red; 'x': y; width: 1px"), vec!["width"]);
    }

    #[test]
    fn important_is_stripped() {
        let decls = parse_declarations("color: red ! IMPORTANT");
        assert_eq!(decls[0].value, vec![CssToken::Ident("red".into())]);

        let decls = parse_declarations("color: important");
        assert_eq!(decls[0].value, vec![CssToken::Ident("important".into())]);
    }
}
