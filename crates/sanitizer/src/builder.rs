//! Declarative policy construction.
//!
//! ```
//! use sanitizer::PolicyBuilder;
//!
//! let policy = PolicyBuilder::new()
//!     .allow_elements(["a", "p"])
//!     .allow_attributes(["href"])
//!     .on_elements(["a"])
//!     .allow_standard_url_protocols()
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     policy.sanitize("<p><a href='javascript:x()' onclick=y>hi</a>"),
//!     "<p>hi</p>"
//! );
//! ```

use crate::attribute::{AttributePolicy, AttributeRule, Matching, OneOf, SrcsetCheck};
use crate::attribute::{StyleCheck, UrlCheck};
use crate::element::{ElementPolicy, ElementRule};
use crate::error::PolicyError;
use crate::policy::{AttributeRules, Policy, RuleSet};
use crate::policy::{DROPPED_WITH_CONTENT, NO_TEXT, SKIP_IF_EMPTY};
use crate::processor::EventProcessor;
use crate::rel::{RelPolicy, validate_token};
use crate::url::{STANDARD_PROTOCOLS, URL_ATTRIBUTES, is_valid_scheme};
use css::CssSchema;
use html::BalancerConfig;
use html::names::{
    canonical_attribute_name, canonical_element_name, is_valid_attribute_name,
    is_valid_element_name,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

const INLINE_FORMATTING: &[&str] = &[
    "b", "i", "font", "s", "u", "o", "sup", "sub", "ins", "del", "strong", "strike", "tt",
    "code", "big", "small", "br", "span", "em",
];

const BLOCKS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote",
];

/// Fluent builder for [`Policy`].
///
/// Calls never fail on their own; the first configuration mistake is kept
/// and reported by [`PolicyBuilder::build`]. The builder can be cloned and
/// built any number of times.
#[derive(Clone, Default)]
pub struct PolicyBuilder {
    elements: HashMap<String, ElementRule>,
    attributes: HashMap<String, AttributeRules>,
    dropped: HashSet<String>,
    /// Overrides of the skip-if-empty defaults; `true` skips.
    skip_if_empty: BTreeMap<String, bool>,
    /// Overrides of the text suppression defaults; `true` allows text.
    text: BTreeMap<String, bool>,
    protocols: BTreeSet<String>,
    styling: Option<CssSchema>,
    style_urls: Option<Arc<dyn AttributePolicy>>,
    rel: RelPolicy,
    preprocessors: Vec<Arc<dyn EventProcessor>>,
    postprocessors: Vec<Arc<dyn EventProcessor>>,
    balancer: BalancerConfig,
    error: Option<PolicyError>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, error: PolicyError) {
        self.error.get_or_insert(error);
    }

    fn element_names<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for raw in names {
            let name = canonical_element_name(raw.as_ref());
            if is_valid_element_name(&name) {
                out.push(name);
            } else {
                self.fail(PolicyError::InvalidElementName(raw.as_ref().to_string()));
            }
        }
        out
    }

    fn attribute_names<I, S>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for raw in names {
            let name = canonical_attribute_name(raw.as_ref());
            if is_valid_attribute_name(&name) {
                out.push(name);
            } else {
                self.fail(PolicyError::InvalidAttributeName(raw.as_ref().to_string()));
            }
        }
        out
    }

    pub fn allow_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.elements.entry(name).or_default();
        }
        self
    }

    /// Allow elements and run `policy` on each occurrence after attribute
    /// filtering. Repeated calls chain their transforms in order.
    pub fn allow_elements_with<P, I, S>(mut self, policy: P, names: I) -> Self
    where
        P: ElementPolicy + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let policy: Arc<dyn ElementPolicy> = Arc::new(policy);
        for name in self.element_names(names) {
            self.elements.entry(name).or_default().push(policy.clone());
        }
        self
    }

    pub fn allow_common_inline_formatting_elements(self) -> Self {
        self.allow_elements(INLINE_FORMATTING)
    }

    pub fn allow_common_block_elements(self) -> Self {
        self.allow_elements(BLOCKS)
    }

    /// Forget any rule for the elements; they are unwrapped again (or
    /// dropped, for the dangerous defaults).
    pub fn disallow_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.elements.remove(&name);
        }
        self
    }

    /// Disallow the elements and drop their content too.
    pub fn drop_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.elements.remove(&name);
            self.dropped.insert(name);
        }
        self
    }

    /// Keep the elements even when none of their attributes survive.
    pub fn allow_without_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.skip_if_empty.insert(name, false);
        }
        self
    }

    pub fn disallow_without_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.skip_if_empty.insert(name, true);
        }
        self
    }

    pub fn allow_text_in<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.text.insert(name, true);
        }
        self
    }

    pub fn disallow_text_in<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in self.element_names(names) {
            self.text.insert(name, false);
        }
        self
    }

    pub fn allow_attributes<I, S>(mut self, names: I) -> AttributeBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = self.attribute_names(names);
        AttributeBuilder::new(self, names, Mode::Allow)
    }

    pub fn disallow_attributes<I, S>(mut self, names: I) -> AttributeBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = self.attribute_names(names);
        AttributeBuilder::new(self, names, Mode::Disallow)
    }

    pub fn allow_url_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in protocols {
            let protocol = raw.as_ref().to_ascii_lowercase();
            if is_valid_scheme(&protocol) {
                self.protocols.insert(protocol);
            } else {
                self.fail(PolicyError::InvalidProtocol(raw.as_ref().to_string()));
            }
        }
        self
    }

    pub fn disallow_url_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for protocol in protocols {
            self.protocols.remove(&protocol.as_ref().to_ascii_lowercase());
        }
        self
    }

    /// `http`, `https` and `mailto`.
    pub fn allow_standard_url_protocols(self) -> Self {
        self.allow_url_protocols(STANDARD_PROTOCOLS)
    }

    /// Filter `style` attributes through the default CSS whitelist and allow
    /// them on every element.
    pub fn allow_styling(self) -> Self {
        self.allow_styling_with(CssSchema::default_whitelist())
    }

    /// Like [`PolicyBuilder::allow_styling`] with a custom schema. Schemas
    /// from repeated calls are unioned.
    pub fn allow_styling_with(mut self, schema: &CssSchema) -> Self {
        self.styling = Some(match self.styling.take() {
            Some(existing) => existing.union(schema),
            None => schema.clone(),
        });
        self
    }

    /// Let `url(...)` values in styles through when `policy` accepts them.
    /// They still have to pass the protocol check.
    pub fn allow_urls_in_styles<P: AttributePolicy + 'static>(mut self, policy: P) -> Self {
        self.style_urls = Some(Arc::new(policy));
        self
    }

    /// Add `rel` tokens to links with an `href`.
    pub fn require_rels_on_links<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            match validate_token(token.as_ref()) {
                Ok(token) => self.rel.require(token),
                Err(error) => self.fail(error),
            }
        }
        self
    }

    /// Never emit these `rel` tokens, including the `noopener noreferrer`
    /// added for links with a `target`.
    pub fn skip_rels_on_links<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            match validate_token(token.as_ref()) {
                Ok(token) => self.rel.skip(token),
                Err(error) => self.fail(error),
            }
        }
        self
    }

    pub fn require_rel_nofollow_on_links(self) -> Self {
        self.require_rels_on_links(["nofollow"])
    }

    /// Processors run in declaration order on the stream before filtering.
    pub fn with_preprocessor<P: EventProcessor + 'static>(mut self, processor: P) -> Self {
        self.preprocessors.push(Arc::new(processor));
        self
    }

    /// Processors run in declaration order on the filtered stream; their
    /// output is not checked against the policy.
    pub fn with_postprocessor<P: EventProcessor + 'static>(mut self, processor: P) -> Self {
        self.postprocessors.push(Arc::new(processor));
        self
    }

    pub fn max_nesting_depth(mut self, max_depth: usize) -> Self {
        self.balancer.max_depth = max_depth;
        self
    }

    pub fn build(&self) -> Result<Policy, PolicyError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let protocols = Arc::new(self.protocols.clone());
        let mut attributes = self.attributes.clone();
        for &name in URL_ATTRIBUTES {
            if let Some(rules) = attributes.get_mut(name) {
                let check: Arc<dyn AttributePolicy> = Arc::new(UrlCheck {
                    protocols: protocols.clone(),
                });
                for_each_rule(rules, |rule| rule.push(check.clone()));
            }
        }
        if let Some(rules) = attributes.get_mut("srcset") {
            let check: Arc<dyn AttributePolicy> = Arc::new(SrcsetCheck {
                protocols: protocols.clone(),
            });
            for_each_rule(rules, |rule| rule.push(check.clone()));
        }
        if let Some(schema) = &self.styling {
            let check = StyleCheck {
                schema: schema.clone(),
                protocols: protocols.clone(),
                urls: self.style_urls.clone(),
            };
            attributes
                .entry("style".to_string())
                .or_default()
                .global
                .get_or_insert_with(AttributeRule::default)
                .push(Arc::new(check));
        }

        let rules = RuleSet {
            elements: self.elements.clone(),
            attributes,
            dropped: DROPPED_WITH_CONTENT
                .iter()
                .map(|name| name.to_string())
                .chain(self.dropped.iter().cloned())
                .collect(),
            skip_if_empty: with_overrides(SKIP_IF_EMPTY, &self.skip_if_empty, true),
            no_text: with_overrides(NO_TEXT, &self.text, false),
            rel: self.rel.clone(),
            preprocessors: self.preprocessors.clone(),
            postprocessors: self.postprocessors.clone(),
        };
        Ok(Policy::from_rules(rules, self.balancer))
    }
}

fn for_each_rule(rules: &mut AttributeRules, mut f: impl FnMut(&mut AttributeRule)) {
    rules.global.iter_mut().chain(rules.elements.values_mut()).for_each(&mut f);
}

/// `defaults` plus the names overridden to `member`, minus those overridden
/// to `!member`.
fn with_overrides(
    defaults: &[&str],
    overrides: &BTreeMap<String, bool>,
    member: bool,
) -> HashSet<String> {
    let mut set: HashSet<String> = defaults.iter().map(|name| name.to_string()).collect();
    for (name, &value) in overrides {
        if value == member {
            set.insert(name.clone());
        } else {
            set.remove(name);
        }
    }
    set
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Allow,
    Disallow,
}

/// Scopes an `allow_attributes`/`disallow_attributes` call. Finish with
/// [`AttributeBuilder::on_elements`] or [`AttributeBuilder::globally`].
#[must_use]
pub struct AttributeBuilder {
    parent: PolicyBuilder,
    names: Vec<String>,
    filters: Vec<Arc<dyn AttributePolicy>>,
    mode: Mode,
}

impl AttributeBuilder {
    fn new(parent: PolicyBuilder, names: Vec<String>, mode: Mode) -> Self {
        Self {
            parent,
            names,
            filters: Vec::new(),
            mode,
        }
    }

    /// Add a value filter. Filters run in the order given.
    pub fn matching<P: AttributePolicy + 'static>(mut self, policy: P) -> Self {
        self.filters.push(Arc::new(policy));
        self
    }

    /// Accept values the whole of which match `pattern`.
    pub fn matching_regex(mut self, pattern: &str) -> Self {
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => self.matching(Matching(regex)),
            Err(error) => {
                self.parent.fail(PolicyError::Pattern(error));
                self
            }
        }
    }

    pub fn matching_values<I, S>(self, ignore_case: bool, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.matching(OneOf::new(ignore_case, values))
    }

    pub fn on_elements<I, S>(mut self, elements: I) -> PolicyBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let elements = self.parent.element_names(elements);
        let filters = std::mem::take(&mut self.filters);
        let mode = self.mode;
        let mut parent = self.parent;
        for name in self.names {
            let rules = parent.attributes.entry(name).or_default();
            for element in &elements {
                match mode {
                    Mode::Allow => {
                        let rule = rules.elements.entry(element.clone()).or_default();
                        filters.iter().for_each(|f| rule.push(f.clone()));
                    }
                    Mode::Disallow => {
                        rules.elements.remove(element);
                    }
                }
            }
        }
        parent
    }

    pub fn globally(self) -> PolicyBuilder {
        let mut parent = self.parent;
        for name in self.names {
            let rules = parent.attributes.entry(name).or_default();
            match self.mode {
                Mode::Allow => {
                    let rule = rules.global.get_or_insert_with(AttributeRule::default);
                    self.filters.iter().for_each(|f| rule.push(f.clone()));
                }
                Mode::Disallow => rules.global = None,
            }
        }
        parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_mistakes_surface_at_build() {
        let bad_rel = PolicyBuilder::new().require_rels_on_links(["nofollow noreferrer"]);
        assert!(matches!(bad_rel.build(), Err(PolicyError::RelTokenWhitespace(_))));

        let bad_pattern = PolicyBuilder::new()
            .allow_attributes(["title"])
            .matching_regex("(")
            .globally();
        assert!(matches!(bad_pattern.build(), Err(PolicyError::Pattern(_))));

        let bad_name = PolicyBuilder::new().allow_elements(["a b"]);
        assert_eq!(
            bad_name.build().err(),
            Some(PolicyError::InvalidElementName("a b".into()))
        );

        let bad_protocol = PolicyBuilder::new().allow_url_protocols(["java script"]);
        assert!(matches!(bad_protocol.build(), Err(PolicyError::InvalidProtocol(_))));
    }

    #[test]
    fn empty_declarations_are_harmless() {
        let empty: [&str; 0] = [];
        let policy = PolicyBuilder::new()
            .allow_elements(empty)
            .allow_attributes(empty)
            .globally()
            .build();
        assert!(policy.is_ok());
    }

    #[test]
    fn regex_matches_the_whole_value() {
        let policy = PolicyBuilder::new()
            .allow_elements(["p"])
            .allow_attributes(["title"])
            .matching_regex("OK|ok")
            .on_elements(["p"])
            .build()
            .unwrap();
        assert_eq!(policy.sanitize("<p title=OK>x</p>"), r#"<p title="OK">x</p>"#);
        assert_eq!(policy.sanitize("<p title=NOT-OK>x</p>"), "<p>x</p>");
    }

    #[test]
    fn disallow_removes_only_the_named_scope() {
        let policy = PolicyBuilder::new()
            .allow_elements(["p", "div"])
            .allow_attributes(["title"])
            .globally()
            .allow_attributes(["title"])
            .on_elements(["p"])
            .disallow_attributes(["title"])
            .globally()
            .build()
            .unwrap();
        assert_eq!(
            policy.sanitize("<p title=a>x</p><div title=b>y</div>"),
            r#"<p title="a">x</p><div>y</div>"#
        );
    }

    #[test]
    fn without_attributes_overrides_the_defaults() {
        let policy = PolicyBuilder::new()
            .allow_elements(["span", "b"])
            .allow_without_attributes(["span"])
            .disallow_without_attributes(["b"])
            .build()
            .unwrap();
        assert_eq!(policy.sanitize("<span>x</span><b>y</b>"), "<span>x</span>y");
    }

    #[test]
    fn common_bundles() {
        let policy = PolicyBuilder::new()
            .allow_common_inline_formatting_elements()
            .allow_common_block_elements()
            .build()
            .unwrap();
        assert_eq!(
            policy.sanitize("<blockquote><p><strong>a</strong><br>b</p></blockquote><table>"),
            "<blockquote><p><strong>a</strong><br />b</p></blockquote>"
        );
    }
}
