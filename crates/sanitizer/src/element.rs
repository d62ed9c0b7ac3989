use html::Attribute;
use std::fmt;
use std::sync::Arc;

/// Outcome of an element transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementDecision {
    Keep,
    /// Emit the element under another name.
    Rename(String),
    /// Drop the element together with its content.
    Reject,
}

/// Transform applied to an allowed element after its attributes have been
/// filtered. It may rewrite the attribute list; attributes it adds are not
/// filtered again.
pub trait ElementPolicy: Send + Sync {
    fn apply(&self, name: &str, attributes: &mut Vec<Attribute>) -> ElementDecision;
}

impl<F> ElementPolicy for F
where
    F: Fn(&str, &mut Vec<Attribute>) -> ElementDecision + Send + Sync,
{
    fn apply(&self, name: &str, attributes: &mut Vec<Attribute>) -> ElementDecision {
        self(name, attributes)
    }
}

/// Chain of transforms for one allowed element; empty means keep as is.
#[derive(Clone, Default)]
pub(crate) struct ElementRule {
    transforms: Vec<Arc<dyn ElementPolicy>>,
}

impl fmt::Debug for ElementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementRule({} transforms)", self.transforms.len())
    }
}

impl ElementRule {
    pub(crate) fn push(&mut self, transform: Arc<dyn ElementPolicy>) {
        self.transforms.push(transform);
    }

    /// Run the chain. Each transform sees the name produced by the one
    /// before it.
    pub(crate) fn apply(&self, name: &str, attributes: &mut Vec<Attribute>) -> ElementDecision {
        let mut current: Option<String> = None;
        for transform in &self.transforms {
            let seen = current.as_deref().unwrap_or(name);
            match transform.apply(seen, attributes) {
                ElementDecision::Keep => {}
                ElementDecision::Rename(renamed) => current = Some(renamed),
                ElementDecision::Reject => return ElementDecision::Reject,
            }
        }
        match current {
            Some(renamed) if renamed != name => ElementDecision::Rename(renamed),
            _ => ElementDecision::Keep,
        }
    }
}

/// Combine the decisions of two policy layers for the same element.
pub(crate) fn intersect(left: ElementDecision, right: ElementDecision) -> ElementDecision {
    use ElementDecision::*;
    match (left, right) {
        (Reject, _) | (_, Reject) => Reject,
        (Keep, other) | (other, Keep) => other,
        (Rename(a), Rename(b)) if a == b => Rename(a),
        (Rename(_), Rename(_)) => Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_threads_names_and_stops_on_reject() {
        let mut rule = ElementRule::default();
        rule.push(Arc::new(|name: &str, attrs: &mut Vec<Attribute>| {
            attrs.push(Attribute::new("class", format!("header-{name}")));
            ElementDecision::Rename("div".into())
        }));
        rule.push(Arc::new(|name: &str, _: &mut Vec<Attribute>| {
            assert_eq!(name, "div");
            ElementDecision::Keep
        }));
        let mut attrs = Vec::new();
        assert_eq!(rule.apply("h1", &mut attrs), ElementDecision::Rename("div".into()));
        assert_eq!(attrs, vec![Attribute::new("class", "header-h1")]);

        rule.push(Arc::new(|_: &str, _: &mut Vec<Attribute>| ElementDecision::Reject));
        assert_eq!(rule.apply("h1", &mut Vec::new()), ElementDecision::Reject);
    }

    #[test]
    fn renames_must_agree_across_layers() {
        use ElementDecision::*;
        assert_eq!(intersect(Keep, Rename("div".into())), Rename("div".into()));
        assert_eq!(intersect(Rename("div".into()), Rename("div".into())), Rename("div".into()));
        assert_eq!(intersect(Rename("div".into()), Rename("span".into())), Reject);
        assert_eq!(intersect(Keep, Reject), Reject);
    }
}
