//! CSS tokenizer for declaration lists.
//!
//! Follows the CSS Syntax tokenization rules closely enough that escapes,
//! comments, strings and `url(...)` forms decode the way a browser would
//! see them. Tokens that a browser would treat as errors (`BadString`,
//! `BadUrl`) are kept so the filter can reject the declaration containing
//! them.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssToken {
    Ident(String),
    /// Name of a function, without the `(`.
    Function(String),
    AtKeyword(String),
    /// Hash without the `#`.
    Hash(String),
    String(String),
    BadString,
    Url(String),
    BadUrl,
    Number(String),
    Percentage(String),
    Dimension(String, String),
    UnicodeRange(String),
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Delim(char),
    Cdo,
    Cdc,
}

impl CssToken {
    /// Whether the token opens a nested block that ends with `)` or `]`.
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            CssToken::Function(_) | CssToken::OpenParen | CssToken::OpenBracket
        )
    }
}

// input: "color: red"
// output: [Ident("color"), Colon, Whitespace, Ident("red")]
pub fn tokenize(input: &str) -> Vec<CssToken> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut out = Vec::new();
    while let Some(token) = lexer.next_token() {
        out.push(token);
    }
    out
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_non_printable(c: char) -> bool {
    matches!(c, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}

impl Lexer {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_escape(&self, offset: usize) -> bool {
        self.peek(offset) == Some('\\') && self.peek(offset + 1).is_some_and(|c| c != '\n')
    }

    fn starts_ident(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some('-') => {
                self.peek(offset + 1).is_some_and(|c| is_name_start(c) || c == '-')
                    || self.starts_escape(offset + 1)
            }
            Some('\\') => self.starts_escape(offset),
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    fn starts_number(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Some('+' | '-') => match self.peek(offset + 1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => self.peek(offset + 2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            },
            Some('.') => self.peek(offset + 1).is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn next_token(&mut self) -> Option<CssToken> {
        let mut saw_comment = false;
        while self.peek(0) == Some('/') && self.peek(1) == Some('*') {
            self.skip_comment();
            saw_comment = true;
        }
        let Some(c) = self.peek(0) else {
            return saw_comment.then_some(CssToken::Whitespace);
        };
        if is_whitespace(c) {
            while self.peek(0).is_some_and(is_whitespace) {
                self.pos += 1;
            }
            return Some(CssToken::Whitespace);
        }
        let token = match c {
            '"' | '\'' => {
                self.pos += 1;
                self.consume_string(c)
            }
            '#' if self.peek(1).is_some_and(is_name_char) || self.starts_escape(1) => {
                self.pos += 1;
                CssToken::Hash(self.consume_name())
            }
            '(' => self.single(CssToken::OpenParen),
            ')' => self.single(CssToken::CloseParen),
            '[' => self.single(CssToken::OpenBracket),
            ']' => self.single(CssToken::CloseBracket),
            '{' => self.single(CssToken::OpenBrace),
            '}' => self.single(CssToken::CloseBrace),
            ',' => self.single(CssToken::Comma),
            ':' => self.single(CssToken::Colon),
            ';' => self.single(CssToken::Semicolon),
            '-' if self.peek(1) == Some('-') && self.peek(2) == Some('>') => {
                self.pos += 3;
                CssToken::Cdc
            }
            '<' if self.chars[self.pos..].starts_with(&['<', '!', '-', '-']) => {
                self.pos += 4;
                CssToken::Cdo
            }
            '@' if self.starts_ident(1) => {
                self.pos += 1;
                CssToken::AtKeyword(self.consume_name())
            }
            'u' | 'U'
                if self.peek(1) == Some('+')
                    && self.peek(2).is_some_and(|c| c.is_ascii_hexdigit() || c == '?') =>
            {
                self.consume_unicode_range()
            }
            _ if self.starts_number(0) => self.consume_numeric(),
            _ if self.starts_ident(0) => self.consume_ident_like(),
            _ => self.single(CssToken::Delim(c)),
        };
        Some(token)
    }

    fn single(&mut self, token: CssToken) -> CssToken {
        self.pos += 1;
        token
    }

    fn skip_comment(&mut self) {
        self.pos += 2;
        while let Some(c) = self.peek(0) {
            if c == '*' && self.peek(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Consume an escape; `pos` is just past the backslash.
    fn consume_escape(&mut self) -> char {
        let Some(c) = self.peek(0) else {
            return '\u{FFFD}';
        };
        if !c.is_ascii_hexdigit() {
            self.pos += 1;
            return c;
        }
        let mut value = 0u32;
        let mut digits = 0;
        while digits < 6 && let Some(d) = self.peek(0).and_then(|c| c.to_digit(16)) {
            value = value * 16 + d;
            digits += 1;
            self.pos += 1;
        }
        if self.peek(0).is_some_and(is_whitespace) {
            self.pos += 1;
        }
        match char::from_u32(value) {
            Some('\0') | None => '\u{FFFD}',
            Some(ch) => ch,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek(0) {
                Some(c) if is_name_char(c) => {
                    name.push(c);
                    self.pos += 1;
                }
                Some('\\') if self.starts_escape(0) => {
                    self.pos += 1;
                    name.push(self.consume_escape());
                }
                _ => return name,
            }
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        let mut value = String::new();
        while let Some(c) = self.peek(0) {
            match c {
                _ if c == quote => {
                    self.pos += 1;
                    return CssToken::String(value);
                }
                '\n' => return CssToken::BadString,
                '\\' => {
                    self.pos += 1;
                    match self.peek(0) {
                        None => {}
                        Some('\n') => self.pos += 1,
                        Some(_) => value.push(self.consume_escape()),
                    }
                }
                _ => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
        CssToken::String(value)
    }

    fn consume_number(&mut self) -> String {
        let mut repr = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek(0) {
            repr.push(sign);
            self.pos += 1;
        }
        self.consume_digits(&mut repr);
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            self.pos += 1;
            self.consume_digits(&mut repr);
        }
        if let Some(e @ ('e' | 'E')) = self.peek(0) {
            let signed = matches!(self.peek(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                repr.push(e);
                if signed && let Some(sign) = self.peek(1) {
                    repr.push(sign);
                }
                self.pos += digit_at;
                self.consume_digits(&mut repr);
            }
        }
        repr
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(c) = self.peek(0).filter(char::is_ascii_digit) {
            repr.push(c);
            self.pos += 1;
        }
    }

    fn consume_numeric(&mut self) -> CssToken {
        let repr = self.consume_number();
        if self.starts_ident(0) {
            let unit = self.consume_name();
            return CssToken::Dimension(repr, unit);
        }
        if self.peek(0) == Some('%') {
            self.pos += 1;
            return CssToken::Percentage(repr);
        }
        CssToken::Number(repr)
    }

    fn consume_unicode_range(&mut self) -> CssToken {
        let start = self.pos;
        self.pos += 2;
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_hexdigit() || c == '?' || c == '-')
        {
            self.pos += 1;
        }
        CssToken::UnicodeRange(self.chars[start..self.pos].iter().collect())
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();
        if self.peek(0) != Some('(') {
            return CssToken::Ident(name);
        }
        self.pos += 1;
        if !name.eq_ignore_ascii_case("url") {
            return CssToken::Function(name);
        }
        let mut lookahead = 0;
        while self.peek(lookahead).is_some_and(is_whitespace) {
            lookahead += 1;
        }
        if matches!(self.peek(lookahead), Some('"' | '\'')) {
            // Quoted URLs tokenize as a function call with a string argument.
            return CssToken::Function(name);
        }
        self.pos += lookahead;
        self.consume_url()
    }

    fn consume_url(&mut self) -> CssToken {
        let mut value = String::new();
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                ')' => return CssToken::Url(value),
                _ if is_whitespace(c) => {
                    while self.peek(0).is_some_and(is_whitespace) {
                        self.pos += 1;
                    }
                    return match self.peek(0) {
                        Some(')') => {
                            self.pos += 1;
                            CssToken::Url(value)
                        }
                        None => CssToken::Url(value),
                        Some(_) => self.consume_bad_url(),
                    };
                }
                '"' | '\'' | '(' => return self.consume_bad_url(),
                _ if is_non_printable(c) => return self.consume_bad_url(),
                '\\' if self.peek(0).is_some_and(|n| n != '\n') => {
                    value.push(self.consume_escape());
                }
                '\\' => return self.consume_bad_url(),
                _ => value.push(c),
            }
        }
        CssToken::Url(value)
    }

    fn consume_bad_url(&mut self) -> CssToken {
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            if c == ')' {
                break;
            }
            if c == '\\' && self.peek(0).is_some() {
                self.pos += 1;
            }
        }
        CssToken::BadUrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CssToken::*;

    #[test]
    fn tokenizes_declarations() {
        assert_eq!(
            tokenize("color: #F00; width:-1.5em"),
            vec![
                Ident("color".into()),
                Colon,
                Whitespace,
                Hash("F00".into()),
                Semicolon,
                Whitespace,
                Ident("width".into()),
                Colon,
                Dimension("-1.5".into(), "em".into()),
            ]
        );
    }

    #[test]
    fn decodes_escapes_in_identifiers_and_strings() {
        assert_eq!(tokenize(r"\65 xpression("), vec![Function("expression".into())]);
        assert_eq!(tokenize(r"'a\'b\22'"), vec![String("a'b\"".into())]);
    }

    #[test]
    fn url_forms() {
        assert_eq!(tokenize("url( a.png )"), vec![Url("a.png".into())]);
        assert_eq!(
            tokenize("URL('a b.png')"),
            vec![Function("URL".into()), String("a b.png".into()), CloseParen]
        );
        assert_eq!(tokenize("url(a b)x"), vec![BadUrl, Ident("x".into())]);
    }

    #[test]
    fn comments_separate_tokens() {
        assert_eq!(
            tokenize("a/* c */b/* open"),
            vec![Ident("a".into()), Ident("b".into()), Whitespace]
        );
    }

    #[test]
    fn long_comment_runs_are_skipped_iteratively() {
        let input = format!("{{{}color:red", "/**/".repeat(100_000));
        let tokens = tokenize(&input);
        assert_eq!(
            tokens,
            vec![OpenBrace, Ident("color".into()), Colon, Ident("red".into())]
        );
        assert_eq!(tokenize(&"/**/".repeat(100_000)), vec![Whitespace]);
    }

    #[test]
    fn numbers_percentages_and_exponents() {
        assert_eq!(
            tokenize("50% .5 +3 1e3px"),
            vec![
                Percentage("50".into()),
                Whitespace,
                Number(".5".into()),
                Whitespace,
                Number("+3".into()),
                Whitespace,
                Dimension("1e3".into(), "px".into()),
            ]
        );
    }

    #[test]
    fn unterminated_string_on_newline_is_bad() {
        assert_eq!(tokenize("'abc\nd"), vec![BadString, Whitespace, Ident("d".into())]);
    }
}
