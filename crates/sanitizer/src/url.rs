//! URL protocol checks for URL-bearing attributes and CSS `url(...)` values.

use log::debug;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Protocols enabled by `allow_standard_url_protocols`.
pub const STANDARD_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

/// Attributes whose value is a single URL.
pub const URL_ATTRIBUTES: &[&str] = &[
    "action",
    "archive",
    "background",
    "cite",
    "classid",
    "codebase",
    "data",
    "formaction",
    "href",
    "icon",
    "longdesc",
    "manifest",
    "poster",
    "profile",
    "src",
    "usemap",
];

const COLON_LOOKALIKES: &[char] = &[
    '\u{0589}', '\u{05C3}', '\u{2236}', '\u{FE13}', '\u{FE55}', '\u{FF1A}',
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme<'a> {
    /// No scheme; resolved against the embedding document.
    Relative,
    Named(&'a str),
    /// Something before the first `:` that is not a valid scheme.
    Malformed,
}

// input: "HTTP://x/", "foo.html", "java\0script:x"
// output: Named("HTTP"), Relative, Malformed
pub fn scheme_of(url: &str) -> Scheme<'_> {
    let Some(end) = url.find(['/', '#', '?', ':']) else {
        return Scheme::Relative;
    };
    if url.as_bytes()[end] != b':' {
        return Scheme::Relative;
    }
    if is_valid_scheme(&url[..end]) {
        Scheme::Named(&url[..end])
    } else {
        Scheme::Malformed
    }
}

pub fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// Returns the normalized URL when its scheme is absent or allowed.
/// `protocols` holds lowercase scheme names.
pub fn check_url(url: &str, protocols: &BTreeSet<String>) -> Option<String> {
    match scheme_of(url) {
        Scheme::Relative => {}
        Scheme::Named(scheme) => {
            if !protocols.contains(&scheme.to_ascii_lowercase()) {
                debug!(target: "sanitizer.policy", "reject protocol {scheme}");
                return None;
            }
        }
        Scheme::Malformed => {
            debug!(target: "sanitizer.policy", "reject malformed scheme in {url:?}");
            return None;
        }
    }
    Some(normalize_uri(url))
}

// input: "foo bar(1).png"
// output: "foo%20bar%281%29.png"
//
// Parentheses, braces and characters at or below U+0020 are encoded
// everywhere; colon look-alikes only before the scheme delimiter could have
// appeared, so they cannot turn a relative URL into an absolute one.
pub fn normalize_uri(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut colons_irrelevant = false;
    for c in url.chars() {
        match c {
            '/' | '#' | '?' | ':' => {
                colons_irrelevant = true;
                out.push(c);
            }
            '(' | ')' | '{' | '}' => percent_encode(c, &mut out),
            c if c <= ' ' => percent_encode(c, &mut out),
            c if !colons_irrelevant && COLON_LOOKALIKES.contains(&c) => {
                percent_encode(c, &mut out)
            }
            c => out.push(c),
        }
    }
    out
}

fn percent_encode(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        let _ = write!(out, "%{byte:02x}");
    }
}
