//! `rel` normalization on links.

use crate::error::PolicyError;
use html::Attribute;
use std::collections::BTreeSet;

/// Tokens added to links that open in another browsing context.
const TARGET_RELS: &[&str] = &["noopener", "noreferrer"];

/// Required and skipped `rel` tokens.
///
/// Within one builder the later declaration of a token wins; merging two
/// policies unions both sets, so a token skipped by either is skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelPolicy {
    extra: Vec<String>,
    skip: BTreeSet<String>,
}

pub(crate) fn validate_token(token: &str) -> Result<String, PolicyError> {
    if token.is_empty() {
        return Err(PolicyError::EmptyRelToken);
    }
    if token.chars().any(char::is_whitespace) {
        return Err(PolicyError::RelTokenWhitespace(token.to_string()));
    }
    Ok(token.to_ascii_lowercase())
}

impl RelPolicy {
    pub fn require(&mut self, token: String) {
        self.skip.remove(&token);
        if !self.extra.contains(&token) {
            self.extra.push(token);
        }
    }

    pub fn skip(&mut self, token: String) {
        self.extra.retain(|extra| *extra != token);
        self.skip.insert(token);
    }

    pub fn merge(&mut self, other: &RelPolicy) {
        for token in &other.extra {
            if !self.extra.contains(token) {
                self.extra.push(token.clone());
            }
        }
        self.skip.extend(other.skip.iter().cloned());
    }

    /// Rewrite the `rel` attribute of a link carrying `href`.
    pub fn apply(&self, attributes: &mut Vec<Attribute>) {
        if !attributes.iter().any(|attr| attr.name == "href") {
            return;
        }
        let has_target = attributes.iter().any(|attr| attr.name == "target");
        if !has_target && self.extra.is_empty() {
            return;
        }
        let position = attributes.iter().position(|attr| attr.name == "rel");
        let mut tokens: Vec<String> = Vec::new();
        if let Some(index) = position {
            for token in attributes[index].value.split_ascii_whitespace() {
                let token = token.to_ascii_lowercase();
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        let defaults = TARGET_RELS.iter().filter(|_| has_target).map(|t| t.to_string());
        for token in self.extra.iter().cloned().chain(defaults) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens.retain(|token| !self.skip.contains(token));

        let value = tokens.join(" ");
        match (position, value.is_empty()) {
            (Some(index), true) => {
                attributes.remove(index);
            }
            (Some(index), false) => attributes[index].value = value,
            (None, true) => {}
            (None, false) => attributes.push(Attribute::new("rel", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(attrs: &[(&str, &str)]) -> Vec<Attribute> {
        attrs.iter().map(|(n, v)| Attribute::new(*n, *v)).collect()
    }

    fn rel_of(policy: &RelPolicy, attrs: &[(&str, &str)]) -> Option<String> {
        let mut attributes = link(attrs);
        policy.apply(&mut attributes);
        attributes
            .into_iter()
            .find(|attr| attr.name == "rel")
            .map(|attr| attr.value)
    }

    #[test]
    fn targets_get_noopener_noreferrer() {
        let policy = RelPolicy::default();
        assert_eq!(
            rel_of(&policy, &[("target", "T"), ("href", "x")]).as_deref(),
            Some("noopener noreferrer")
        );
        assert_eq!(rel_of(&policy, &[("href", "x"), ("rel", "Foo")]).as_deref(), Some("Foo"));
        assert_eq!(rel_of(&policy, &[("target", "T")]), None);
    }

    #[test]
    fn existing_tokens_are_normalized_and_kept_in_place() {
        let mut policy = RelPolicy::default();
        policy.require("nofollow".into());
        let mut attrs = link(&[("rel", "EXTERNAL external"), ("target", "_blank"), ("href", "/")]);
        policy.apply(&mut attrs);
        assert_eq!(attrs[0].name, "rel");
        assert_eq!(attrs[0].value, "external nofollow noopener noreferrer");
    }

    #[test]
    fn later_declaration_wins_within_a_builder() {
        let mut skip_last = RelPolicy::default();
        skip_last.require("noreferrer".into());
        skip_last.skip("noopener".into());
        skip_last.skip("noreferrer".into());
        assert_eq!(rel_of(&skip_last, &[("href", "x"), ("target", "_blank")]), None);

        let mut require_last = RelPolicy::default();
        require_last.skip("noopener".into());
        require_last.skip("noreferrer".into());
        require_last.require("noreferrer".into());
        assert_eq!(
            rel_of(&require_last, &[("href", "x"), ("target", "_blank"), ("rel", "noopener")])
                .as_deref(),
            Some("noreferrer")
        );
    }

    #[test]
    fn merged_policies_let_skip_win() {
        let mut external = RelPolicy::default();
        external.require("external".into());
        let mut no_referrer = RelPolicy::default();
        no_referrer.skip("noreferrer".into());

        for (first, second) in [(&external, &no_referrer), (&no_referrer, &external)] {
            let mut merged = first.clone();
            merged.merge(second);
            assert_eq!(
                rel_of(&merged, &[("target", "T"), ("href", "http://x/")]).as_deref(),
                Some("external noopener")
            );
        }
    }

    #[test]
    fn tokens_with_spaces_are_configuration_errors() {
        assert_eq!(
            validate_token("nofollow noreferrer"),
            Err(PolicyError::RelTokenWhitespace("nofollow noreferrer".into()))
        );
        assert_eq!(validate_token("NoFollow").as_deref(), Ok("nofollow"));
    }
}
