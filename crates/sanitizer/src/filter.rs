use crate::policy::{Disposition, Policy};
use html::{Attribute, EventSink, is_void_element};
use log::trace;

const TARGET: &str = "sanitizer.filter";

#[derive(Debug)]
enum State {
    /// Emitted under the output name.
    Emitted(String),
    Unwrapped,
    Dropped,
}

#[derive(Debug)]
struct Open {
    source: String,
    state: State,
}

/// Applies a [`Policy`] to a normalized event stream.
///
/// Every open tag gets a [`Disposition`]. Close tags are matched against
/// the source name, so renamed elements close under their output name and
/// unwrapped ones close silently.
pub(crate) struct PolicyFilter<'p, S> {
    policy: &'p Policy,
    stack: Vec<Open>,
    /// Open entries that suppress text, dropped or text-free.
    muted: usize,
    next: S,
}

impl<'p, S: EventSink> PolicyFilter<'p, S> {
    pub(crate) fn new(policy: &'p Policy, next: S) -> Self {
        Self {
            policy,
            stack: Vec::new(),
            muted: 0,
            next,
        }
    }

    fn mutes(&self, open: &Open) -> bool {
        matches!(open.state, State::Dropped) || !self.policy.allows_text_in(&open.source)
    }

    fn pop_to(&mut self, index: usize) {
        while self.stack.len() > index {
            let Some(open) = self.stack.pop() else {
                break;
            };
            if self.mutes(&open) {
                self.muted -= 1;
            }
            if let State::Emitted(name) = &open.state {
                self.next.close_tag(name);
            }
        }
    }
}

impl<S: EventSink> EventSink for PolicyFilter<'_, S> {
    fn open_document(&mut self) {
        self.next.open_document();
    }

    fn close_document(&mut self) {
        self.pop_to(0);
        self.next.close_document();
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        let inside_dropped = self
            .stack
            .iter()
            .any(|open| matches!(open.state, State::Dropped));
        let state = if inside_dropped {
            State::Dropped
        } else {
            match self.policy.decide(name, attributes) {
                Disposition::Emit { name: out, attributes } => {
                    self.next.open_tag(&out, attributes);
                    State::Emitted(out)
                }
                Disposition::Unwrap => State::Unwrapped,
                Disposition::Drop => State::Dropped,
            }
        };
        trace!(target: TARGET, "open {name} -> {state:?}");
        if is_void_element(name) {
            return;
        }
        let open = Open {
            source: name.to_string(),
            state,
        };
        if self.mutes(&open) {
            self.muted += 1;
        }
        self.stack.push(open);
    }

    fn close_tag(&mut self, name: &str) {
        match self.stack.iter().rposition(|open| open.source == name) {
            Some(index) => self.pop_to(index),
            None => trace!(target: TARGET, "ignore unmatched close {name}"),
        }
    }

    fn text(&mut self, text: &str) {
        if self.muted == 0 {
            self.next.text(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PolicyBuilder;
    use html::{VecSink, format_events};

    fn filter(policy: &Policy, feed: impl FnOnce(&mut dyn EventSink)) -> String {
        let mut out = VecSink::new();
        {
            let mut filter = PolicyFilter::new(policy, &mut out);
            feed(&mut filter);
            filter.close_document();
        }
        format_events(&out.into_events())
    }

    #[test]
    fn dropped_elements_take_their_content() {
        let policy = PolicyBuilder::new().allow_elements(["b"]).build().unwrap();
        let out = filter(&policy, |sink| {
            sink.open_tag("script", Vec::new());
            sink.open_tag("b", Vec::new());
            sink.text("x");
            sink.close_tag("b");
            sink.close_tag("script");
            sink.open_tag("u", Vec::new());
            sink.text("y");
            sink.close_tag("u");
        });
        assert_eq!(out, r#""y""#);
    }

    #[test]
    fn renamed_elements_close_under_the_new_name() {
        let policy = PolicyBuilder::new()
            .allow_elements_with(
                |_: &str, _: &mut Vec<Attribute>| crate::ElementDecision::Rename("div".into()),
                ["h1"],
            )
            .build()
            .unwrap();
        let out = filter(&policy, |sink| {
            sink.open_tag("h1", Vec::new());
            sink.text("t");
            sink.close_tag("h1");
            sink.close_tag("p");
        });
        assert_eq!(out, r#"<div>"t"</div>"#);
    }

    #[test]
    fn text_free_elements_stay_empty() {
        let policy = PolicyBuilder::new().allow_elements(["style", "p"]).build().unwrap();
        let out = filter(&policy, |sink| {
            sink.open_tag("style", Vec::new());
            sink.text("p { color: red }");
            sink.close_tag("style");
            sink.open_tag("p", Vec::new());
        });
        assert_eq!(out, "<style></style><p></p>");
    }

    #[test]
    fn unclosed_elements_close_at_the_end() {
        let policy = PolicyBuilder::new().allow_elements(["i", "b"]).build().unwrap();
        let out = filter(&policy, |sink| {
            sink.open_tag("i", Vec::new());
            sink.open_tag("span", Vec::new());
            sink.open_tag("b", Vec::new());
            sink.open_tag("br", Vec::new());
        });
        assert_eq!(out, "<i><b></b></i>");
    }
}
