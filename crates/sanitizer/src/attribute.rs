//! Attribute value filters.

use crate::srcset::filter_srcset;
use crate::url::check_url;
use css::CssSchema;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Decides whether an attribute value survives, returning the value to
/// emit. Receives the element name, attribute name and current value.
pub trait AttributePolicy: Send + Sync {
    fn apply(&self, element: &str, attribute: &str, value: &str) -> Option<String>;
}

impl<F> AttributePolicy for F
where
    F: Fn(&str, &str, &str) -> Option<String> + Send + Sync,
{
    fn apply(&self, element: &str, attribute: &str, value: &str) -> Option<String> {
        self(element, attribute, value)
    }
}

/// Accepts values the regular expression matches. Anchoring is up to the
/// pattern; `PolicyBuilder::matching_regex` anchors at both ends.
pub struct Matching(pub Regex);

impl AttributePolicy for Matching {
    fn apply(&self, _: &str, _: &str, value: &str) -> Option<String> {
        self.0.is_match(value).then(|| value.to_string())
    }
}

/// Accepts values from a fixed set.
pub struct OneOf {
    values: BTreeSet<String>,
    ignore_case: bool,
}

impl OneOf {
    pub fn new<I, S>(ignore_case: bool, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = values
            .into_iter()
            .map(|value| {
                let value = value.as_ref();
                if ignore_case {
                    value.to_lowercase()
                } else {
                    value.to_string()
                }
            })
            .collect();
        Self {
            values,
            ignore_case,
        }
    }
}

impl AttributePolicy for OneOf {
    fn apply(&self, _: &str, _: &str, value: &str) -> Option<String> {
        if self.ignore_case {
            let folded = value.to_lowercase();
            self.values.contains(&folded).then_some(folded)
        } else {
            self.values.contains(value).then(|| value.to_string())
        }
    }
}

/// Protocol check for URL-valued attributes.
pub(crate) struct UrlCheck {
    pub(crate) protocols: Arc<BTreeSet<String>>,
}

impl AttributePolicy for UrlCheck {
    fn apply(&self, _: &str, _: &str, value: &str) -> Option<String> {
        check_url(value.trim(), &self.protocols)
    }
}

/// Per-candidate protocol check for `srcset`.
pub(crate) struct SrcsetCheck {
    pub(crate) protocols: Arc<BTreeSet<String>>,
}

impl AttributePolicy for SrcsetCheck {
    fn apply(&self, _: &str, _: &str, value: &str) -> Option<String> {
        filter_srcset(value, &|url| check_url(url, &self.protocols))
    }
}

/// CSS filtering for `style` attributes.
pub(crate) struct StyleCheck {
    pub(crate) schema: CssSchema,
    pub(crate) protocols: Arc<BTreeSet<String>>,
    /// Caller filter for URLs in styles; `None` rejects every URL.
    pub(crate) urls: Option<Arc<dyn AttributePolicy>>,
}

impl AttributePolicy for StyleCheck {
    fn apply(&self, element: &str, attribute: &str, value: &str) -> Option<String> {
        let check = |url: &str| {
            let policy = self.urls.as_ref()?;
            let url = policy.apply(element, attribute, url)?;
            check_url(&url, &self.protocols)
        };
        let filtered = css::sanitize_style(value, &self.schema, Some(&check));
        (!filtered.is_empty()).then_some(filtered)
    }
}

/// Chain of value filters for one attribute; empty accepts any value.
#[derive(Clone, Default)]
pub(crate) struct AttributeRule {
    filters: Vec<Arc<dyn AttributePolicy>>,
}

impl fmt::Debug for AttributeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeRule({} filters)", self.filters.len())
    }
}

impl AttributeRule {
    pub(crate) fn push(&mut self, filter: Arc<dyn AttributePolicy>) {
        self.filters.push(filter);
    }

    pub(crate) fn apply(&self, element: &str, attribute: &str, value: String) -> Option<String> {
        let mut value = value;
        for filter in &self.filters {
            value = filter.apply(element, attribute, &value)?;
        }
        Some(value)
    }
}
