//! Leaf value checks and the canonical serialization of accepted values.

use std::fmt::Write as _;

/// Named colors accepted wherever a color literal is allowed.
pub const COLOR_NAMES: &[&str] = &[
    "aqua",
    "black",
    "blue",
    "brown",
    "currentcolor",
    "cyan",
    "darkblue",
    "darkgray",
    "darkgreen",
    "darkgrey",
    "darkred",
    "fuchsia",
    "gold",
    "gray",
    "green",
    "grey",
    "indigo",
    "lightblue",
    "lightgray",
    "lightgreen",
    "lightgrey",
    "lime",
    "magenta",
    "maroon",
    "navy",
    "olive",
    "orange",
    "pink",
    "purple",
    "red",
    "silver",
    "teal",
    "transparent",
    "violet",
    "white",
    "yellow",
];

const UNITS: &[&str] = &[
    "ch", "cm", "deg", "dpcm", "dpi", "dppx", "em", "ex", "fr", "grad", "hz", "in", "khz", "mm",
    "ms", "pc", "pt", "px", "q", "rad", "rem", "s", "turn", "vh", "vmax", "vmin", "vw",
];

/// Words that never pass as free-form identifiers even when a property
/// accepts arbitrary words.
const RESERVED_WORDS: &[&str] = &[
    "expression",
    "important",
    "inherit",
    "initial",
    "javascript",
    "revert",
    "unset",
    "url",
    "vbscript",
];

/// Keywords every property accepts when they form the whole value.
pub const CSS_WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "revert", "unset"];

pub fn is_known_unit(unit: &str) -> bool {
    UNITS.contains(&unit)
}

pub fn is_negative(repr: &str) -> bool {
    repr.starts_with('-') && repr.bytes().any(|b| matches!(b, b'1'..=b'9'))
}

// input: "F00", "a0b1c2", "abcd"
// output: true for 3, 4, 6 or 8 hex digits
pub fn is_hex_color(hash: &str) -> bool {
    matches!(hash.len(), 3 | 4 | 6 | 8) && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Identifier that round-trips without escapes and is not reserved.
pub fn is_unreserved_word(word: &str) -> bool {
    let mut bytes = word.bytes();
    let starts_ok = match bytes.next() {
        Some(b'-') => word.len() > 1 && !word.as_bytes()[1].is_ascii_digit(),
        Some(b) => b.is_ascii_alphabetic() || b == b'_',
        None => false,
    };
    starts_ok
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        && !RESERVED_WORDS.contains(&word.to_ascii_lowercase().as_str())
}

// input: "it's"
// output: "'it\27 s'"
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' | '"' | '\\' | '<' | '>' | '&' => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\{:x} ", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

// input: "blue sky.png"
// output: "url('blue%20sky.png')"
pub fn quote_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 7);
    out.push_str("url('");
    for c in url.chars() {
        match c {
            '\'' | '"' | '\\' | '(' | ')' | '<' | '>' => {
                let _ = write!(out, "%{:02x}", c as u32);
            }
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "%{byte:02x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push_str("')");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("F00"));
        assert!(is_hex_color("a0b1c2"));
        assert!(!is_hex_color("ff00f"));
        assert!(!is_hex_color("ggg"));
    }

    #[test]
    fn negative_zero_is_not_negative() {
        assert!(is_negative("-1.5"));
        assert!(!is_negative("-0.0"));
        assert!(!is_negative("+3"));
    }

    #[test]
    fn unreserved_words() {
        assert!(is_unreserved_word("Arial"));
        assert!(is_unreserved_word("-webkit-box"));
        assert!(!is_unreserved_word("-1x"));
        assert!(!is_unreserved_word("a\"b"));
        assert!(!is_unreserved_word("Expression"));
        assert!(!is_unreserved_word(""));
    }

    #[test]
    fn quoting_escapes_markup_significant_characters() {
        assert_eq!(quote_string("it's <b>"), r"'it\27 s \3c b\3e '");
        assert_eq!(quote_url("a b'(x).png"), "url('a%20b%27%28x%29.png')");
    }
}
