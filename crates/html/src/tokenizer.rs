//! Fault-tolerant HTML lexer.
//!
//! Recognizes start/end tags, attributes (quoted, unquoted, valueless),
//! comments, bogus comments, and raw-text element bodies. It never fails:
//! malformed constructs degrade to literal text or are dropped, and every
//! recovery is reported to the caller's [`ErrorSink`].
//!
//! Known limitations (intentional):
//! - No namespace-aware tokenization; CDATA sections are bogus comments.
//! - CR/LF pairs are not normalized.
//! - A tag still open at end of input is dropped, as browsers do.

use crate::entities::decode_entities_reporting;
use crate::error::{ErrorSink, IgnoreErrors, ParseErrorCode, report};
use crate::event::Attribute;
use crate::names::{TextKind, canonical_attribute_name, canonical_element_name, text_kind};
use crate::types::{Token, TokenStream};
use memchr::memchr;

const COMMENT_START: &[u8] = b"<!--";
const TARGET: &str = "html.tokenizer";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack
        .get(start..start + needle.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(needle))
}

fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Tokenize `input`, discarding parse errors.
pub fn tokenize(input: &str) -> TokenStream {
    tokenize_reporting(input, &mut IgnoreErrors)
}

/// Tokenize `input`, reporting recoverable anomalies to `errors`.
pub fn tokenize_reporting(input: &str, errors: &mut dyn ErrorSink) -> TokenStream {
    Tokenizer::new(input, errors).run()
}

/// Single-pass lexer over one input string.
///
/// Invariant: `pos` and every slice endpoint sit on UTF-8 boundaries. The
/// lexer only cuts at ASCII structural bytes, which never occur inside a
/// multi-byte sequence.
pub struct Tokenizer<'a, 'e> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    out: Vec<Token>,
    errors: &'e mut dyn ErrorSink,
}

struct LexedTag {
    attributes: Vec<Attribute>,
    self_closing: bool,
    end: usize,
}

impl<'a, 'e> Tokenizer<'a, 'e> {
    pub fn new(input: &'a str, errors: &'e mut dyn ErrorSink) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            out: Vec::new(),
            errors,
        }
    }

    pub fn run(mut self) -> TokenStream {
        let len = self.bytes.len();
        while self.pos < len {
            match memchr(b'<', &self.bytes[self.pos..]) {
                None => {
                    self.push_text(self.pos, len, true);
                    self.pos = len;
                }
                Some(rel) => {
                    if rel > 0 {
                        self.push_text(self.pos, self.pos + rel, true);
                    }
                    self.pos += rel;
                    self.lex_markup();
                }
            }
        }
        TokenStream::new(self.out)
    }

    fn report(&mut self, code: ParseErrorCode, position: usize) {
        report(self.errors, TARGET, code, position);
    }

    fn push_text(&mut self, start: usize, end: usize, decode: bool) {
        debug_assert!(self.input.is_char_boundary(start));
        debug_assert!(self.input.is_char_boundary(end));
        if start >= end {
            return;
        }
        let raw = &self.input[start..end];
        let text = if decode {
            decode_entities_reporting(raw, start, self.errors)
        } else {
            raw.to_string()
        };
        if let Some(Token::Text(last)) = self.out.last_mut() {
            last.push_str(&text);
        } else {
            self.out.push(Token::Text(text));
        }
    }

    /// Handle the construct starting at the `<` under `pos`.
    fn lex_markup(&mut self) {
        let lt = self.pos;
        match self.bytes.get(lt + 1).copied() {
            Some(b'!') if self.bytes[lt..].starts_with(COMMENT_START) => self.lex_comment(),
            Some(b'!') => {
                if !starts_with_ignore_ascii_case_at(self.bytes, lt, b"<!doctype") {
                    self.report(ParseErrorCode::BogusComment, lt);
                }
                self.skip_bogus_comment(lt + 2);
            }
            Some(b'?') => {
                self.report(ParseErrorCode::BogusComment, lt);
                self.skip_bogus_comment(lt + 1);
            }
            Some(b'/') => match self.bytes.get(lt + 2).copied() {
                Some(b) if b.is_ascii_alphabetic() => self.lex_end_tag(),
                Some(b'>') => {
                    self.report(ParseErrorCode::BogusComment, lt);
                    self.pos = lt + 3;
                }
                Some(_) => {
                    self.report(ParseErrorCode::BogusComment, lt);
                    self.skip_bogus_comment(lt + 2);
                }
                None => {
                    self.push_text(lt, self.bytes.len(), false);
                    self.pos = self.bytes.len();
                }
            },
            Some(b) if b.is_ascii_alphabetic() => self.lex_start_tag(),
            _ => {
                self.push_text(lt, lt + 1, false);
                self.pos = lt + 1;
            }
        }
    }

    fn lex_comment(&mut self) {
        let start = self.pos;
        let body = start + COMMENT_START.len();
        // `<!-->` and `<!--->` are complete, empty comments.
        if self.bytes.get(body) == Some(&b'>') {
            self.pos = body + 1;
            return;
        }
        if self.bytes.get(body..body + 2) == Some(b"->") {
            self.pos = body + 2;
            return;
        }
        let mut i = body;
        while let Some(rel) = memchr(b'-', &self.bytes[i..]) {
            let dash = i + rel;
            let rest = &self.bytes[dash..];
            if rest.starts_with(b"-->") {
                self.pos = dash + 3;
                return;
            }
            if rest.starts_with(b"--!>") {
                self.pos = dash + 4;
                return;
            }
            i = dash + 1;
        }
        self.report(ParseErrorCode::UnterminatedComment, start);
        self.pos = self.bytes.len();
    }

    fn skip_bogus_comment(&mut self, from: usize) {
        self.pos = match memchr(b'>', &self.bytes[from.min(self.bytes.len())..]) {
            Some(rel) => from + rel + 1,
            None => self.bytes.len(),
        };
    }

    fn scan_tag_name(&self, start: usize) -> usize {
        let mut j = start;
        while j < self.bytes.len()
            && !is_html_whitespace(self.bytes[j])
            && self.bytes[j] != b'/'
            && self.bytes[j] != b'>'
        {
            j += 1;
        }
        j
    }

    fn lex_end_tag(&mut self) {
        let lt = self.pos;
        let name_start = lt + 2;
        let name_end = self.scan_tag_name(name_start);
        let name = canonical_element_name(&self.input[name_start..name_end]);
        match self.lex_attributes(name_end) {
            Some(tag) => {
                log::trace!(target: TARGET, "end tag </{name}> at {lt}");
                self.out.push(Token::EndTag { name, position: lt });
                self.pos = tag.end;
            }
            None => {
                self.report(ParseErrorCode::UnterminatedTag, lt);
                self.pos = self.bytes.len();
            }
        }
    }

    fn lex_start_tag(&mut self) {
        let lt = self.pos;
        let name_start = lt + 1;
        let name_end = self.scan_tag_name(name_start);
        let name = canonical_element_name(&self.input[name_start..name_end]);
        let Some(tag) = self.lex_attributes(name_end) else {
            self.report(ParseErrorCode::UnterminatedTag, lt);
            self.pos = self.bytes.len();
            return;
        };
        log::trace!(
            target: TARGET,
            "start tag <{name}> at {lt} with {} attributes",
            tag.attributes.len()
        );
        let kind = text_kind(&name);
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes: tag.attributes,
            self_closing: tag.self_closing,
            position: lt,
        });
        self.pos = tag.end;
        match kind {
            TextKind::Markup => {}
            TextKind::RawText => self.lex_raw_text(&name, false),
            TextKind::EscapableRawText => self.lex_raw_text(&name, true),
            TextKind::Plaintext => {
                self.push_text(self.pos, self.bytes.len(), false);
                self.pos = self.bytes.len();
            }
        }
    }

    /// Lex attributes up to and including the closing `>`.
    ///
    /// Returns `None` if the input ends first.
    fn lex_attributes(&mut self, from: usize) -> Option<LexedTag> {
        let bytes = self.bytes;
        let len = bytes.len();
        let mut k = from;
        let mut attributes = Vec::new();
        loop {
            while k < len && is_html_whitespace(bytes[k]) {
                k += 1;
            }
            if k >= len {
                return None;
            }
            match bytes[k] {
                b'>' => {
                    return Some(LexedTag {
                        attributes,
                        self_closing: false,
                        end: k + 1,
                    });
                }
                b'/' if bytes.get(k + 1) == Some(&b'>') => {
                    return Some(LexedTag {
                        attributes,
                        self_closing: true,
                        end: k + 2,
                    });
                }
                b'/' => {
                    k += 1;
                    continue;
                }
                _ => {}
            }

            let name_start = k;
            // A leading `=` belongs to the name.
            if bytes[k] == b'=' {
                k += 1;
            }
            while k < len
                && !is_html_whitespace(bytes[k])
                && !matches!(bytes[k], b'/' | b'>' | b'=')
            {
                k += 1;
            }
            let name = canonical_attribute_name(&self.input[name_start..k]);

            while k < len && is_html_whitespace(bytes[k]) {
                k += 1;
            }
            let value = if k < len && bytes[k] == b'=' {
                k += 1;
                while k < len && is_html_whitespace(bytes[k]) {
                    k += 1;
                }
                if k >= len {
                    return None;
                }
                match bytes[k] {
                    quote @ (b'"' | b'\'') => {
                        let value_start = k + 1;
                        let close = value_start + memchr(quote, &bytes[value_start..])?;
                        k = close + 1;
                        decode_entities_reporting(
                            &self.input[value_start..close],
                            value_start,
                            self.errors,
                        )
                    }
                    b'>' => String::new(),
                    _ => {
                        let value_start = k;
                        while k < len && !is_html_whitespace(bytes[k]) && bytes[k] != b'>' {
                            k += 1;
                        }
                        let raw = &self.input[value_start..k];
                        decode_entities_reporting(raw, value_start, self.errors)
                    }
                }
            } else {
                name.clone()
            };
            attributes.push(Attribute { name, value });
        }
    }

    /// Consume the body of a raw-text element whose start tag was just lexed.
    fn lex_raw_text(&mut self, name: &str, decode: bool) {
        let start = self.pos;
        match find_raw_text_close(self.input, start, name) {
            Some((close_start, close_end)) => {
                self.push_text(start, close_start, decode);
                self.out.push(Token::EndTag {
                    name: name.to_string(),
                    position: close_start,
                });
                self.pos = close_end;
            }
            None => {
                self.report(ParseErrorCode::UnterminatedRawText, start);
                self.push_text(start, self.bytes.len(), decode);
                self.out.push(Token::EndTag {
                    name: name.to_string(),
                    position: self.bytes.len(),
                });
                self.pos = self.bytes.len();
            }
        }
    }
}

/// Find the close tag of raw-text element `name` at or after `from`.
///
/// A close tag is `</` followed by a tag name whose canonical form is exactly
/// `name`, followed by whitespace, `/` or `>`. Everything else, including
/// comment delimiters and quoted data, is content. Returns the byte range of
/// the whole close tag.
fn find_raw_text_close(input: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = from;
    while i < len {
        let lt = i + memchr(b'<', &bytes[i..])?;
        if bytes.get(lt + 1) == Some(&b'/') {
            let name_start = lt + 2;
            let mut j = name_start;
            while j < len && !is_html_whitespace(bytes[j]) && bytes[j] != b'/' && bytes[j] != b'>' {
                j += 1;
            }
            let candidate = &input[name_start..j];
            if j < len
                && candidate.len() == name.len()
                && candidate.eq_ignore_ascii_case(name)
                && canonical_element_name(candidate) == name
            {
                let end = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel + 1);
                return Some((lt, end));
            }
        }
        i = lt + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    fn start_names(stream: &TokenStream) -> Vec<&str> {
        stream
            .iter()
            .filter_map(|t| match t {
                Token::StartTag { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tokenize_preserves_utf8_text() {
        let stream = tokenize("¡Hola <b>café</b> 😊");
        assert!(
            matches!(
                stream.tokens(),
                [
                    Token::Text(a),
                    Token::StartTag { name, .. },
                    Token::Text(b),
                    Token::EndTag { .. },
                    Token::Text(c),
                ] if a == "¡Hola " && name == "b" && b == "café" && c == " 😊"
            ),
            "expected UTF-8 text around tags, got: {stream:?}"
        );
    }

    #[test]
    fn attributes_quoted_unquoted_and_valueless() {
        let stream = tokenize(r#"<DIR Compact title='a &amp; b' data-x=1/2 id="q">"#);
        let Some(Token::StartTag { name, attributes, .. }) = stream.tokens().first() else {
            panic!("expected start tag, got: {stream:?}");
        };
        assert_eq!(name, "dir");
        assert_eq!(
            attributes,
            &vec![
                Attribute::new("compact", "compact"),
                Attribute::new("title", "a & b"),
                Attribute::new("data-x", "1/2"),
                Attribute::new("id", "q"),
            ]
        );
    }

    #[test]
    fn duplicate_attributes_are_all_surfaced() {
        let stream = tokenize(r#"<a href="foo" id='far' id="bar" href=baz id=boo>link</a>"#);
        let Some(Token::StartTag { attributes, .. }) = stream.tokens().first() else {
            panic!("expected start tag, got: {stream:?}");
        };
        let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["href", "id", "id", "href", "id"]);
    }

    #[test]
    fn comments_doctypes_and_processing_instructions_vanish() {
        let stream = tokenize("<!DOCTYPE html>a<!-- <b> -->b<?xml x?>c<!-->d<!--x--!>e");
        assert_eq!(stream.tokens(), &[Token::Text("abcde".to_string())]);
    }

    #[test]
    fn stray_less_than_is_text() {
        let stream = tokenize("1 < 2 <3 <> </>x");
        assert_eq!(stream.tokens(), &[Token::Text("1 < 2 <3 <> x".to_string())]);
    }

    #[test]
    fn unterminated_tag_is_dropped_and_reported() {
        let mut errors: Vec<ParseError> = Vec::new();
        let stream = tokenize_reporting("ok<a href='x", &mut errors);
        assert_eq!(stream.tokens(), &[Token::Text("ok".to_string())]);
        assert_eq!(errors, vec![ParseError::new(ParseErrorCode::UnterminatedTag, 2)]);
    }

    #[test]
    fn script_body_is_raw_and_closes_case_insensitively() {
        let stream = tokenize("<script>if (a < b) { x = '<!-- </b> -->'; }</ScRiPt >after");
        assert!(
            matches!(
                stream.tokens(),
                [
                    Token::StartTag { name, .. },
                    Token::Text(body),
                    Token::EndTag { name: end, .. },
                    Token::Text(after),
                ] if name == "script"
                    && body == "if (a < b) { x = '<!-- </b> -->'; }"
                    && end == "script"
                    && after == "after"
            ),
            "expected raw script body, got: {stream:?}"
        );
    }

    #[test]
    fn textarea_and_svg_text_area_do_not_close_each_other() {
        let stream = tokenize("<textarea>x &lt; </textArea> y</textarea><textArea>z</textArea>");
        assert!(
            matches!(
                stream.tokens(),
                [
                    Token::StartTag { name: a, .. },
                    Token::Text(body),
                    Token::EndTag { name: b, .. },
                    Token::StartTag { name: c, .. },
                    Token::Text(z),
                    Token::EndTag { name: d, .. },
                ] if a == "textarea"
                    && body == "x < </textArea> y"
                    && b == "textarea"
                    && c == "textArea"
                    && z == "z"
                    && d == "textArea"
            ),
            "expected distinct textarea identities, got: {stream:?}"
        );
    }

    #[test]
    fn json_in_script_with_escaped_comment_close() {
        let body = r#"{"a": "-->", "b": "<\/script>"}"#;
        let stream = tokenize(&format!(r#"<script type="application/json">{body}</script>"#));
        assert!(
            stream.iter().any(|t| matches!(t, Token::Text(s) if s == body)),
            "expected JSON body intact, got: {stream:?}"
        );
    }

    #[test]
    fn unclosed_raw_text_runs_to_end_and_reports() {
        let mut errors: Vec<ParseError> = Vec::new();
        let stream = tokenize_reporting("<style>a{}</styl", &mut errors);
        assert!(
            matches!(
                stream.tokens(),
                [Token::StartTag { .. }, Token::Text(body), Token::EndTag { .. }]
                    if body == "a{}</styl"
            ),
            "expected style body to run to end, got: {stream:?}"
        );
        assert_eq!(errors[0].code, ParseErrorCode::UnterminatedRawText);
    }

    #[test]
    fn self_closing_script_still_starts_raw_text() {
        let stream = tokenize("<script/><b>x</b></script><i>");
        assert_eq!(start_names(&stream), vec!["script", "i"]);
    }

    #[test]
    fn plaintext_consumes_rest_of_input() {
        let stream = tokenize("<plaintext><b>&amp;</plaintext>");
        assert!(
            matches!(
                stream.tokens(),
                [Token::StartTag { .. }, Token::Text(rest)] if rest == "<b>&amp;</plaintext>"
            ),
            "expected plaintext body, got: {stream:?}"
        );
    }

    #[test]
    fn dense_near_match_raw_text_body_is_linear() {
        let mut body = String::new();
        for _ in 0..50_000 {
            body.push_str("</scripX>");
        }
        let stream = tokenize(&format!("<script>{body}</script>"));
        assert!(
            stream.iter().any(|t| matches!(t, Token::Text(s) if *s == body)),
            "expected dense body to survive intact"
        );
    }

    #[test]
    fn end_tag_attributes_with_quoted_gt_are_skipped() {
        let stream = tokenize(r#"<b>x</b title=">">y"#);
        assert!(
            matches!(
                stream.tokens(),
                [_, _, Token::EndTag { name, .. }, Token::Text(y)] if name == "b" && y == "y"
            ),
            "expected quoted > inside end tag to be skipped, got: {stream:?}"
        );
    }
}
