//! Character reference decoding.
//!
//! Contract:
//! - Named references decode only when `;`-terminated and present in [`NAMED_REFERENCES`]
//!   (the HTML 4 set plus `&apos;`).
//! - Numeric references decode when well-formed and `;`-terminated: `&#9830;`, `&#x2666;`,
//!   `&#X2666;`.
//! - A numeric high surrogate immediately followed by a numeric low surrogate combines into a
//!   single supplementary scalar (`&#xD83D;&#xDE00;` decodes to U+1F600).
//! - Anything else passes through unchanged, including invalid scalars and lone surrogates.

use crate::error::{ErrorSink, IgnoreErrors, ParseErrorCode, report};
use memchr::memchr;

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111
const MAX_NAME_LEN: usize = 8;

/// Decode every character reference in `s`.
pub fn decode_entities(s: &str) -> String {
    decode_entities_reporting(s, 0, &mut IgnoreErrors)
}

/// Decode `s`, reporting malformed references at `base` plus their offset in `s`.
pub(crate) fn decode_entities_reporting(
    s: &str,
    base: usize,
    errors: &mut dyn ErrorSink,
) -> String {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return s.to_string();
    };
    let mut out = String::with_capacity(s.len());
    let mut i = first;
    let mut copy_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        debug_assert!(s.is_char_boundary(i));
        out.push_str(&s[copy_start..i]);

        if bytes.get(i + 1) == Some(&b'#') {
            match scan_numeric(bytes, s, i) {
                Some((value, next)) => {
                    if let Some((ch, next)) = combine_surrogates(bytes, s, value, next) {
                        out.push(ch);
                        i = next;
                    } else if let Some(ch) = char::from_u32(value) {
                        out.push(ch);
                        i = next;
                    } else {
                        malformed(errors, base + i);
                        out.push_str(&s[i..next]);
                        i = next;
                    }
                }
                None => {
                    malformed(errors, base + i);
                    out.push('&');
                    i += 1;
                }
            }
            copy_start = i;
            continue;
        }

        let name_start = i + 1;
        let mut j = name_start;
        while j < bytes.len()
            && j - name_start <= MAX_NAME_LEN
            && bytes[j].is_ascii_alphanumeric()
        {
            j += 1;
        }
        let decoded = (j > name_start && bytes.get(j) == Some(&b';'))
            .then(|| lookup_named(&s[name_start..j]))
            .flatten();
        match decoded {
            Some(ch) => {
                out.push(ch);
                i = j + 1;
            }
            None => {
                if j > name_start {
                    malformed(errors, base + i);
                }
                out.push('&');
                i += 1;
            }
        }
        copy_start = i;
    }

    if copy_start < bytes.len() {
        out.push_str(&s[copy_start..]);
    }
    out
}

fn malformed(errors: &mut dyn ErrorSink, position: usize) {
    report(errors, "html.entities", ParseErrorCode::MalformedCharacterReference, position);
}

/// Scan a `&#...;` reference starting at `start` (the `&`).
///
/// Returns the numeric value and the index just past the `;`. The digit run is bounded so
/// adversarial input cannot cause quadratic rescans.
fn scan_numeric(bytes: &[u8], s: &str, start: usize) -> Option<(u32, usize)> {
    let (digits_start, max_digits, radix) = match bytes.get(start + 2) {
        Some(b'x' | b'X') => (start + 3, MAX_HEX_DIGITS, 16),
        _ => (start + 2, MAX_DEC_DIGITS, 10),
    };
    let mut j = digits_start;
    while j < bytes.len()
        && j - digits_start < max_digits
        && (bytes[j] as char).is_digit(radix)
    {
        j += 1;
    }
    if j == digits_start || bytes.get(j) != Some(&b';') {
        return None;
    }
    let value = u32::from_str_radix(&s[digits_start..j], radix).ok()?;
    Some((value, j + 1))
}

fn combine_surrogates(bytes: &[u8], s: &str, high: u32, next: usize) -> Option<(char, usize)> {
    if !(0xD800..=0xDBFF).contains(&high)
        || bytes.get(next) != Some(&b'&')
        || bytes.get(next + 1) != Some(&b'#')
    {
        return None;
    }
    let (low, after) = scan_numeric(bytes, s, next)?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return None;
    }
    let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(scalar).map(|ch| (ch, after))
}

pub(crate) fn lookup_named(name: &str) -> Option<char> {
    NAMED_REFERENCES
        .binary_search_by(|(candidate, _)| candidate.as_bytes().cmp(name.as_bytes()))
        .ok()
        .map(|idx| NAMED_REFERENCES[idx].1)
}

/// Named character references, sorted by byte order for binary search.
pub(crate) static NAMED_REFERENCES: &[(&str, char)] = &[
    ("AElig", '\u{00C6}'),
    ("Aacute", '\u{00C1}'),
    ("Acirc", '\u{00C2}'),
    ("Agrave", '\u{00C0}'),
    ("Alpha", '\u{0391}'),
    ("Aring", '\u{00C5}'),
    ("Atilde", '\u{00C3}'),
    ("Auml", '\u{00C4}'),
    ("Beta", '\u{0392}'),
    ("Ccedil", '\u{00C7}'),
    ("Chi", '\u{03A7}'),
    ("Dagger", '\u{2021}'),
    ("Delta", '\u{0394}'),
    ("ETH", '\u{00D0}'),
    ("Eacute", '\u{00C9}'),
    ("Ecirc", '\u{00CA}'),
    ("Egrave", '\u{00C8}'),
    ("Epsilon", '\u{0395}'),
    ("Eta", '\u{0397}'),
    ("Euml", '\u{00CB}'),
    ("Gamma", '\u{0393}'),
    ("Iacute", '\u{00CD}'),
    ("Icirc", '\u{00CE}'),
    ("Igrave", '\u{00CC}'),
    ("Iota", '\u{0399}'),
    ("Iuml", '\u{00CF}'),
    ("Kappa", '\u{039A}'),
    ("Lambda", '\u{039B}'),
    ("Mu", '\u{039C}'),
    ("Ntilde", '\u{00D1}'),
    ("Nu", '\u{039D}'),
    ("OElig", '\u{0152}'),
    ("Oacute", '\u{00D3}'),
    ("Ocirc", '\u{00D4}'),
    ("Ograve", '\u{00D2}'),
    ("Omega", '\u{03A9}'),
    ("Omicron", '\u{039F}'),
    ("Oslash", '\u{00D8}'),
    ("Otilde", '\u{00D5}'),
    ("Ouml", '\u{00D6}'),
    ("Phi", '\u{03A6}'),
    ("Pi", '\u{03A0}'),
    ("Prime", '\u{2033}'),
    ("Psi", '\u{03A8}'),
    ("Rho", '\u{03A1}'),
    ("Scaron", '\u{0160}'),
    ("Sigma", '\u{03A3}'),
    ("THORN", '\u{00DE}'),
    ("Tau", '\u{03A4}'),
    ("Theta", '\u{0398}'),
    ("Uacute", '\u{00DA}'),
    ("Ucirc", '\u{00DB}'),
    ("Ugrave", '\u{00D9}'),
    ("Upsilon", '\u{03A5}'),
    ("Uuml", '\u{00DC}'),
    ("Xi", '\u{039E}'),
    ("Yacute", '\u{00DD}'),
    ("Yuml", '\u{0178}'),
    ("Zeta", '\u{0396}'),
    ("aacute", '\u{00E1}'),
    ("acirc", '\u{00E2}'),
    ("acute", '\u{00B4}'),
    ("aelig", '\u{00E6}'),
    ("agrave", '\u{00E0}'),
    ("alefsym", '\u{2135}'),
    ("alpha", '\u{03B1}'),
    ("amp", '\u{0026}'),
    ("and", '\u{2227}'),
    ("ang", '\u{2220}'),
    ("apos", '\u{0027}'),
    ("aring", '\u{00E5}'),
    ("asymp", '\u{2248}'),
    ("atilde", '\u{00E3}'),
    ("auml", '\u{00E4}'),
    ("bdquo", '\u{201E}'),
    ("beta", '\u{03B2}'),
    ("brvbar", '\u{00A6}'),
    ("bull", '\u{2022}'),
    ("cap", '\u{2229}'),
    ("ccedil", '\u{00E7}'),
    ("cedil", '\u{00B8}'),
    ("cent", '\u{00A2}'),
    ("chi", '\u{03C7}'),
    ("circ", '\u{02C6}'),
    ("clubs", '\u{2663}'),
    ("cong", '\u{2245}'),
    ("copy", '\u{00A9}'),
    ("crarr", '\u{21B5}'),
    ("cup", '\u{222A}'),
    ("curren", '\u{00A4}'),
    ("dArr", '\u{21D3}'),
    ("dagger", '\u{2020}'),
    ("darr", '\u{2193}'),
    ("deg", '\u{00B0}'),
    ("delta", '\u{03B4}'),
    ("diams", '\u{2666}'),
    ("divide", '\u{00F7}'),
    ("eacute", '\u{00E9}'),
    ("ecirc", '\u{00EA}'),
    ("egrave", '\u{00E8}'),
    ("empty", '\u{2205}'),
    ("emsp", '\u{2003}'),
    ("ensp", '\u{2002}'),
    ("epsilon", '\u{03B5}'),
    ("equiv", '\u{2261}'),
    ("eta", '\u{03B7}'),
    ("eth", '\u{00F0}'),
    ("euml", '\u{00EB}'),
    ("euro", '\u{20AC}'),
    ("exist", '\u{2203}'),
    ("fnof", '\u{0192}'),
    ("forall", '\u{2200}'),
    ("frac12", '\u{00BD}'),
    ("frac14", '\u{00BC}'),
    ("frac34", '\u{00BE}'),
    ("frasl", '\u{2044}'),
    ("gamma", '\u{03B3}'),
    ("ge", '\u{2265}'),
    ("gt", '\u{003E}'),
    ("hArr", '\u{21D4}'),
    ("harr", '\u{2194}'),
    ("hearts", '\u{2665}'),
    ("hellip", '\u{2026}'),
    ("iacute", '\u{00ED}'),
    ("icirc", '\u{00EE}'),
    ("iexcl", '\u{00A1}'),
    ("igrave", '\u{00EC}'),
    ("image", '\u{2111}'),
    ("infin", '\u{221E}'),
    ("int", '\u{222B}'),
    ("iota", '\u{03B9}'),
    ("iquest", '\u{00BF}'),
    ("isin", '\u{2208}'),
    ("iuml", '\u{00EF}'),
    ("kappa", '\u{03BA}'),
    ("lArr", '\u{21D0}'),
    ("lambda", '\u{03BB}'),
    ("lang", '\u{2329}'),
    ("laquo", '\u{00AB}'),
    ("larr", '\u{2190}'),
    ("lceil", '\u{2308}'),
    ("ldquo", '\u{201C}'),
    ("le", '\u{2264}'),
    ("lfloor", '\u{230A}'),
    ("lowast", '\u{2217}'),
    ("loz", '\u{25CA}'),
    ("lrm", '\u{200E}'),
    ("lsaquo", '\u{2039}'),
    ("lsquo", '\u{2018}'),
    ("lt", '\u{003C}'),
    ("macr", '\u{00AF}'),
    ("mdash", '\u{2014}'),
    ("micro", '\u{00B5}'),
    ("middot", '\u{00B7}'),
    ("minus", '\u{2212}'),
    ("mu", '\u{03BC}'),
    ("nabla", '\u{2207}'),
    ("nbsp", '\u{00A0}'),
    ("ndash", '\u{2013}'),
    ("ne", '\u{2260}'),
    ("ni", '\u{220B}'),
    ("not", '\u{00AC}'),
    ("notin", '\u{2209}'),
    ("nsub", '\u{2284}'),
    ("ntilde", '\u{00F1}'),
    ("nu", '\u{03BD}'),
    ("oacute", '\u{00F3}'),
    ("ocirc", '\u{00F4}'),
    ("oelig", '\u{0153}'),
    ("ograve", '\u{00F2}'),
    ("oline", '\u{203E}'),
    ("omega", '\u{03C9}'),
    ("omicron", '\u{03BF}'),
    ("oplus", '\u{2295}'),
    ("or", '\u{2228}'),
    ("ordf", '\u{00AA}'),
    ("ordm", '\u{00BA}'),
    ("oslash", '\u{00F8}'),
    ("otilde", '\u{00F5}'),
    ("otimes", '\u{2297}'),
    ("ouml", '\u{00F6}'),
    ("para", '\u{00B6}'),
    ("part", '\u{2202}'),
    ("permil", '\u{2030}'),
    ("perp", '\u{22A5}'),
    ("phi", '\u{03C6}'),
    ("pi", '\u{03C0}'),
    ("piv", '\u{03D6}'),
    ("plusmn", '\u{00B1}'),
    ("pound", '\u{00A3}'),
    ("prime", '\u{2032}'),
    ("prod", '\u{220F}'),
    ("prop", '\u{221D}'),
    ("psi", '\u{03C8}'),
    ("quot", '\u{0022}'),
    ("rArr", '\u{21D2}'),
    ("radic", '\u{221A}'),
    ("rang", '\u{232A}'),
    ("raquo", '\u{00BB}'),
    ("rarr", '\u{2192}'),
    ("rceil", '\u{2309}'),
    ("rdquo", '\u{201D}'),
    ("real", '\u{211C}'),
    ("reg", '\u{00AE}'),
    ("rfloor", '\u{230B}'),
    ("rho", '\u{03C1}'),
    ("rlm", '\u{200F}'),
    ("rsaquo", '\u{203A}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201A}'),
    ("scaron", '\u{0161}'),
    ("sdot", '\u{22C5}'),
    ("sect", '\u{00A7}'),
    ("shy", '\u{00AD}'),
    ("sigma", '\u{03C3}'),
    ("sigmaf", '\u{03C2}'),
    ("sim", '\u{223C}'),
    ("spades", '\u{2660}'),
    ("sub", '\u{2282}'),
    ("sube", '\u{2286}'),
    ("sum", '\u{2211}'),
    ("sup", '\u{2283}'),
    ("sup1", '\u{00B9}'),
    ("sup2", '\u{00B2}'),
    ("sup3", '\u{00B3}'),
    ("supe", '\u{2287}'),
    ("szlig", '\u{00DF}'),
    ("tau", '\u{03C4}'),
    ("there4", '\u{2234}'),
    ("theta", '\u{03B8}'),
    ("thetasym", '\u{03D1}'),
    ("thinsp", '\u{2009}'),
    ("thorn", '\u{00FE}'),
    ("tilde", '\u{02DC}'),
    ("times", '\u{00D7}'),
    ("trade", '\u{2122}'),
    ("uArr", '\u{21D1}'),
    ("uacute", '\u{00FA}'),
    ("uarr", '\u{2191}'),
    ("ucirc", '\u{00FB}'),
    ("ugrave", '\u{00F9}'),
    ("uml", '\u{00A8}'),
    ("upsih", '\u{03D2}'),
    ("upsilon", '\u{03C5}'),
    ("uuml", '\u{00FC}'),
    ("weierp", '\u{2118}'),
    ("xi", '\u{03BE}'),
    ("yacute", '\u{00FD}'),
    ("yen", '\u{00A5}'),
    ("yuml", '\u{00FF}'),
    ("zeta", '\u{03B6}'),
    ("zwj", '\u{200D}'),
    ("zwnj", '\u{200C}'),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    #[test]
    fn named_table_is_sorted() {
        assert!(
            NAMED_REFERENCES.windows(2).all(|w| w[0].0.as_bytes() < w[1].0.as_bytes()),
            "named reference table must be strictly sorted"
        );
    }

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(
            decode_entities("&diams; &#9830; &#x2666; &#X2666;"),
            "\u{2666} \u{2666} \u{2666} \u{2666}"
        );
        assert_eq!(decode_entities("a&nbsp;b &amp; &lt;c&gt; &quot;&apos;"), "a\u{a0}b & <c> \"'");
        assert_eq!(decode_entities("120×32"), "120×32");
    }

    #[test]
    fn decodes_supplementary_scalars() {
        assert_eq!(decode_entities("&#x1D11E;"), "\u{1D11E}");
        assert_eq!(decode_entities("&#119070;"), "\u{1D11E}");
        assert_eq!(decode_entities("&#xD834;&#xDD1E;"), "\u{1D11E}");
    }

    #[test]
    fn unknown_or_unterminated_references_pass_through() {
        assert_eq!(decode_entities("&bogus; &amp &#12 &#x; & x"), "&bogus; &amp &#12 &#x; & x");
        assert_eq!(decode_entities("&#xD834;"), "&#xD834;");
        assert_eq!(decode_entities("&#x110000;"), "&#x110000;");
        assert_eq!(decode_entities("&#99999999999;"), "&#99999999999;");
    }

    #[test]
    fn reports_malformed_references_with_offsets() {
        let mut errors: Vec<ParseError> = Vec::new();
        let out = decode_entities_reporting("ab &nope; &#zz;", 10, &mut errors);
        assert_eq!(out, "ab &nope; &#zz;");
        let positions: Vec<usize> = errors.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![13, 20]);
    }
}
