//! Markup serializer for the filtered event stream.
//!
//! Output is safe to embed in an HTML body: names are validated, attribute
//! values are always double-quoted, and raw-text content is written only when
//! it cannot terminate its element early.

use html::names::{is_valid_attribute_name, is_valid_element_name};
use html::{Attribute, EventSink, TextKind, is_void_element, text_kind};
use log::warn;
use std::fmt::{self, Write};

const TARGET: &str = "sanitizer.render";

/// Writes events as markup into any [`fmt::Write`].
///
/// The first write error is kept and later events are ignored; callers read
/// it back through [`Renderer::finish`].
pub(crate) struct Renderer<W> {
    out: W,
    open: Vec<String>,
    /// Content of the innermost open raw-text element.
    raw: Option<String>,
    error: Option<fmt::Error>,
}

impl<W: Write> Renderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            open: Vec::new(),
            raw: None,
            error: None,
        }
    }

    pub(crate) fn finish(self) -> fmt::Result {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn write(&mut self, f: impl FnOnce(&mut W) -> fmt::Result) {
        if self.error.is_none() {
            if let Err(error) = f(&mut self.out) {
                self.error = Some(error);
            }
        }
    }

    fn write_open(&mut self, name: &str, attributes: &[Attribute]) {
        self.write(|out| {
            write!(out, "<{name}")?;
            for Attribute { name: attr, value } in attributes {
                if !is_valid_attribute_name(attr) {
                    warn!(target: TARGET, "dropping invalid attribute name {attr:?}");
                    continue;
                }
                write!(out, " {attr}=\"")?;
                encode_attribute(value, out)?;
                out.write_char('"')?;
            }
            if is_void_element(name) {
                out.write_str(" />")
            } else {
                out.write_char('>')
            }
        });
    }

    /// Close the innermost open element, flushing raw-text content first.
    fn close_innermost(&mut self) {
        let Some(name) = self.open.pop() else {
            return;
        };
        if let Some(content) = self.raw.take() {
            match uncloseable_at(&name, &content) {
                None => self.write(|out| out.write_str(&content)),
                Some(at) => {
                    warn!(target: TARGET, "dropping {name} content that could close it at {at}")
                }
            }
        }
        self.write(|out| write!(out, "</{name}>"));
    }
}

impl<W: Write> EventSink for Renderer<W> {
    fn close_document(&mut self) {
        while !self.open.is_empty() {
            self.close_innermost();
        }
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        if !is_valid_element_name(name) {
            warn!(target: TARGET, "dropping invalid element name {name:?}");
            return;
        }
        if self.raw.is_some() {
            warn!(target: TARGET, "dropping {name} nested in raw text");
            return;
        }
        // Nothing can close plaintext once written.
        if text_kind(name) == TextKind::Plaintext {
            warn!(target: TARGET, "refusing to render {name}");
            return;
        }
        self.write_open(name, &attributes);
        if is_void_element(name) {
            return;
        }
        if text_kind(name) == TextKind::RawText {
            self.raw = Some(String::new());
        }
        self.open.push(name.to_string());
    }

    fn close_tag(&mut self, name: &str) {
        if is_void_element(name) {
            return;
        }
        let Some(index) = self.open.iter().rposition(|open| open == name) else {
            return;
        };
        while self.open.len() > index {
            self.close_innermost();
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(raw) = self.raw.as_mut() {
            raw.push_str(text);
            return;
        }
        self.write(|out| encode_text(text, out));
    }
}

/// Byte offset at which `content` could end the raw-text element `name`, or
/// `None` if writing it verbatim is safe.
///
/// `<!--` opens an escaping span and `-->` closes it. An end tag for the
/// element itself is only tolerated inside a span, and only in `script`.
fn uncloseable_at(name: &str, content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut span_start: Option<usize> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' if bytes[i..].starts_with(b"<!--") => {
                span_start.get_or_insert(i);
            }
            b'<' if closes(&bytes[i..], name) => {
                if span_start.is_none() || name != "script" {
                    return Some(i);
                }
            }
            b'>' if i >= 2 && &bytes[i - 2..i] == b"--" => {
                if span_start.take().is_none() {
                    return Some(i - 2);
                }
            }
            _ => {}
        }
    }
    span_start
}

fn closes(rest: &[u8], name: &str) -> bool {
    rest.len() >= name.len() + 2
        && rest[1] == b'/'
        && rest[2..2 + name.len()].eq_ignore_ascii_case(name.as_bytes())
}

fn is_stripped(c: char) -> bool {
    (c.is_control() && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

fn encode_text<W: Write + ?Sized>(text: &str, out: &mut W) -> fmt::Result {
    encode(text, out, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

fn encode_attribute<W: Write + ?Sized>(value: &str, out: &mut W) -> fmt::Result {
    encode(value, out, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&#34;"),
        '\'' => Some("&#39;"),
        '=' => Some("&#61;"),
        '`' => Some("&#96;"),
        _ => None,
    })
}

fn encode<W: Write + ?Sized>(
    text: &str,
    out: &mut W,
    entity: impl Fn(char) -> Option<&'static str>,
) -> fmt::Result {
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let replacement = entity(c);
        let supplementary = c as u32 > 0xFFFF;
        if replacement.is_none() && !supplementary && !is_stripped(c) {
            continue;
        }
        out.write_str(&text[start..i])?;
        start = i + c.len_utf8();
        if let Some(entity) = replacement {
            out.write_str(entity)?;
        } else if supplementary {
            write!(out, "&#x{:x};", c as u32)?;
        }
    }
    out.write_str(&text[start..])
}
