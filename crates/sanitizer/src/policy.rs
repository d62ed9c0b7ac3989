use crate::attribute::AttributeRule;
use crate::element::{ElementDecision, ElementRule, intersect};
use crate::processor::EventProcessor;
use crate::rel::RelPolicy;
use html::{Attribute, BalancerConfig};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Elements dropped together with their content when no rule allows them.
pub const DROPPED_WITH_CONTENT: &[&str] = &[
    "applet", "embed", "frame", "frameset", "iframe", "noembed", "noframes", "object",
    "plaintext", "script", "style", "template", "title", "xmp",
];

/// Elements unwrapped when no attribute survives.
pub const SKIP_IF_EMPTY: &[&str] = &["a", "font", "img", "input", "span"];

/// Elements whose text content is suppressed by default.
pub const NO_TEXT: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

/// Elements whose `rel` attribute is normalized.
const LINK_ELEMENTS: &[&str] = &["a", "area"];

#[derive(Clone, Debug, Default)]
pub(crate) struct AttributeRules {
    pub(crate) global: Option<AttributeRule>,
    pub(crate) elements: HashMap<String, AttributeRule>,
}

/// Rules produced by one builder.
#[derive(Clone, Default)]
pub(crate) struct RuleSet {
    pub(crate) elements: HashMap<String, ElementRule>,
    pub(crate) attributes: HashMap<String, AttributeRules>,
    pub(crate) dropped: HashSet<String>,
    pub(crate) skip_if_empty: HashSet<String>,
    pub(crate) no_text: HashSet<String>,
    pub(crate) rel: RelPolicy,
    pub(crate) preprocessors: Vec<Arc<dyn EventProcessor>>,
    pub(crate) postprocessors: Vec<Arc<dyn EventProcessor>>,
}

impl RuleSet {
    /// Keep the first accepted occurrence of each attribute. Every
    /// occurrence is evaluated so that side-effecting filters see them all.
    fn filter_attributes(&self, element: &str, attributes: Vec<Attribute>) -> Vec<Attribute> {
        let mut kept: Vec<Attribute> = Vec::with_capacity(attributes.len());
        for Attribute { name, value } in attributes {
            let Some(rules) = self.attributes.get(&name) else {
                debug!(target: "sanitizer.policy", "drop attribute {name} on {element}");
                continue;
            };
            let specific = rules.elements.get(element);
            if specific.is_none() && rules.global.is_none() {
                debug!(target: "sanitizer.policy", "drop attribute {name} on {element}");
                continue;
            }
            let accepted = [specific, rules.global.as_ref()]
                .into_iter()
                .flatten()
                .try_fold(value, |value, rule| rule.apply(element, &name, value));
            match accepted {
                Some(value) if !kept.iter().any(|attr| attr.name == name) => {
                    kept.push(Attribute { name, value });
                }
                Some(_) => trace!(target: "sanitizer.policy", "duplicate {name} on {element}"),
                None => debug!(target: "sanitizer.policy", "reject value of {name} on {element}"),
            }
        }
        kept
    }
}

/// What the filter does with one element.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Disposition {
    Emit {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Drop the tags, keep the content.
    Unwrap,
    /// Drop the tags and the content.
    Drop,
}

/// An immutable sanitization policy.
///
/// Cheap to clone and safe to share between threads. Policies combined
/// with [`Policy::and`] only let through what every constituent allows.
#[derive(Clone)]
pub struct Policy {
    layers: Vec<Arc<RuleSet>>,
    rel: Arc<RelPolicy>,
    balancer: BalancerConfig,
}

impl Policy {
    pub(crate) fn from_rules(rules: RuleSet, balancer: BalancerConfig) -> Self {
        let rel = Arc::new(rules.rel.clone());
        Self {
            layers: vec![Arc::new(rules)],
            rel,
            balancer,
        }
    }

    /// Intersection of two policies.
    pub fn and(&self, other: &Policy) -> Policy {
        let mut rel = (*self.rel).clone();
        rel.merge(&other.rel);
        Policy {
            layers: self.layers.iter().chain(&other.layers).cloned().collect(),
            rel: Arc::new(rel),
            balancer: BalancerConfig {
                max_depth: self.balancer.max_depth.min(other.balancer.max_depth),
            },
        }
    }

    pub(crate) fn balancer_config(&self) -> BalancerConfig {
        self.balancer
    }

    pub(crate) fn preprocessors(&self) -> impl DoubleEndedIterator<Item = &dyn EventProcessor> {
        self.layers
            .iter()
            .flat_map(|layer| layer.preprocessors.iter().map(as_dyn))
    }

    pub(crate) fn postprocessors(&self) -> impl DoubleEndedIterator<Item = &dyn EventProcessor> {
        self.layers
            .iter()
            .flat_map(|layer| layer.postprocessors.iter().map(as_dyn))
    }

    pub(crate) fn allows_text_in(&self, element: &str) -> bool {
        self.layers.iter().all(|layer| !layer.no_text.contains(element))
    }

    pub(crate) fn decide(&self, name: &str, attributes: Vec<Attribute>) -> Disposition {
        let mut rules = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            match layer.elements.get(name) {
                Some(rule) => rules.push((layer, rule)),
                None => {
                    let dropped = self.layers.iter().any(|l| l.dropped.contains(name));
                    debug!(target: "sanitizer.policy", "no rule for {name}, dropped={dropped}");
                    return if dropped {
                        Disposition::Drop
                    } else {
                        Disposition::Unwrap
                    };
                }
            }
        }

        let mut attributes = attributes;
        let mut decision = ElementDecision::Keep;
        for (layer, rule) in rules {
            attributes = layer.filter_attributes(name, attributes);
            decision = intersect(decision, rule.apply(name, &mut attributes));
        }
        let out = match decision {
            ElementDecision::Keep => name.to_string(),
            ElementDecision::Rename(renamed) => renamed,
            ElementDecision::Reject => {
                debug!(target: "sanitizer.policy", "transform rejected {name}");
                return Disposition::Drop;
            }
        };

        if LINK_ELEMENTS.contains(&out.as_str()) {
            self.rel.apply(&mut attributes);
        }
        let skip = |layer: &Arc<RuleSet>| layer.skip_if_empty.contains(out.as_str());
        if attributes.is_empty() && self.layers.iter().any(skip) {
            debug!(target: "sanitizer.policy", "unwrap {out} without attributes");
            return Disposition::Unwrap;
        }
        Disposition::Emit {
            name: out,
            attributes,
        }
    }
}

fn as_dyn(processor: &Arc<dyn EventProcessor>) -> &dyn EventProcessor {
    processor.as_ref()
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("layers", &self.layers.len())
            .field("rel", &self.rel)
            .field("balancer", &self.balancer)
            .finish()
    }
}
