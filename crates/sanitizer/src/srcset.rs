//! Filtering for `srcset`-style candidate lists: `url [descriptor], ...`.

use log::debug;

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

// input: " /big.png 64w ,/little.png , javascript:x 1x"
// output: Some("/big.png 64w , /little.png")
//
// `check_url` vets each candidate URL and returns the form to emit. A
// candidate with a rejected URL or a malformed descriptor is dropped on its
// own; structural damage (leading comma, empty candidate) or a list with no
// surviving candidate drops the attribute.
pub fn filter_srcset(value: &str, check_url: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let value = value.trim_matches(is_space);
    if value.is_empty() || value.starts_with(',') {
        return None;
    }
    let mut rest = value;
    let mut candidates = Vec::new();
    while !rest.is_empty() {
        let url_end = rest.find(is_space).unwrap_or(rest.len());
        let (url, after) = rest.split_at(url_end);
        rest = after.trim_start_matches(is_space);

        let descriptor_end = rest.find(',').unwrap_or(rest.len());
        let descriptor = rest[..descriptor_end].trim_end_matches(is_space);
        rest = &rest[descriptor_end..];
        if let Some(next) = rest.strip_prefix(',') {
            rest = next.trim_start_matches(is_space);
            if rest.starts_with(',') {
                debug!(target: "sanitizer.policy", "srcset has an empty candidate");
                return None;
            }
        }

        // `foo,bar.png` is a single URL; a trailing comma is not.
        if url.ends_with(',') {
            debug!(target: "sanitizer.policy", "srcset URL {url:?} stuck to a comma");
            continue;
        }
        if !descriptor.is_empty() && !is_valid_descriptor(descriptor) {
            debug!(target: "sanitizer.policy", "srcset descriptor {descriptor:?} rejected");
            continue;
        }
        let Some(url) = check_url(url) else {
            continue;
        };
        let url = url.replace(',', "%2c");
        if descriptor.is_empty() {
            candidates.push(url);
        } else {
            candidates.push(format!("{url} {descriptor}"));
        }
    }
    (!candidates.is_empty()).then(|| candidates.join(" , "))
}

/// `-?(digits[.digits] | .digits)([eE][+-]?digits)?` followed by `w`, `x` or `h`.
fn is_valid_descriptor(descriptor: &str) -> bool {
    let Some(number) = descriptor.strip_suffix(['w', 'x', 'h']) else {
        return false;
    };
    let number = number.strip_prefix('-').unwrap_or(number);
    let (mantissa, exponent) = match number.find(['e', 'E']) {
        Some(at) => (&number[..at], Some(&number[at + 1..])),
        None => (number, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match mantissa.split_once('.') {
        Some(("", fraction)) => digits(fraction),
        Some((whole, fraction)) => digits(whole) && (fraction.is_empty() || digits(fraction)),
        None => digits(mantissa),
    };
    let exponent_ok = exponent.is_none_or(|exp| {
        digits(exp.strip_prefix(['+', '-']).unwrap_or(exp))
    });
    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relative_or_http(url: &str) -> Option<String> {
        (!url.contains(':') || url.starts_with("http:")).then(|| url.to_string())
    }

    fn filter(value: &str) -> Option<String> {
        filter_srcset(value, &relative_or_http)
    }

    #[test]
    fn descriptors() {
        for ok in ["640w", "48x", ".123x", ".123e2x", "123.456E-1x", "-123x"] {
            let input = format!("http://example.com/foo.png {ok}");
            assert_eq!(filter(&input), Some(input.clone()));
        }
        for bad in ["-x", "-.e1", "-1e+x"] {
            assert_eq!(filter(&format!("http://example.com/foo.png {bad}")), None);
        }
    }

    #[test]
    fn separators_are_normalized() {
        let expected = Some("/big.png 64w , /little.png".to_string());
        assert_eq!(filter("/big.png 64w, /little.png"), expected);
        assert_eq!(filter(" /big.png 64w , /little.png"), expected);
        assert_eq!(filter("\t\t/big.png 64w\r\n,/little.png\t\t"), expected);
    }

    #[test]
    fn commas_inside_urls_are_encoded() {
        assert_eq!(filter("foo,bar.png").as_deref(), Some("foo%2cbar.png"));
        assert_eq!(filter("foo.png,,bar.png").as_deref(), Some("foo.png%2c%2cbar.png"));
    }

    #[test]
    fn structural_damage_omits_the_attribute() {
        for input in ["", "  ", ",", "bar.png,", "a ,, b", "a , , b"] {
            assert_eq!(filter(input), None, "{input:?}");
        }
        assert_eq!(filter("foo.png ,").as_deref(), Some("foo.png"));
    }

    #[test]
    fn rejected_urls_drop_their_candidate_only() {
        assert_eq!(
            filter("foo.png 1w, javascript:evil()").as_deref(),
            Some("foo.png 1w")
        );
    }
}
