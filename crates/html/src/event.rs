//! The structural event stream shared by every pipeline stage.
//!
//! Contract: after normalization, open/close events are well nested and void
//! elements produce an open event only. Stages that rewrite the stream
//! (pre/postprocessors) are not bound by that contract; consumers must
//! tolerate unmatched closes.

use std::fmt;

/// One `name="value"` pair. A valueless attribute carries its name as value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value)
    }
}

/// Receiver of structural events.
pub trait EventSink {
    fn open_document(&mut self) {}

    fn close_document(&mut self) {}

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>);

    fn close_tag(&mut self, name: &str);

    fn text(&mut self, text: &str);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn open_document(&mut self) {
        (**self).open_document();
    }

    fn close_document(&mut self) {
        (**self).close_document();
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        (**self).open_tag(name, attributes);
    }

    fn close_tag(&mut self, name: &str) {
        (**self).close_tag(name);
    }

    fn text(&mut self, text: &str) {
        (**self).text(text);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn open_document(&mut self) {
        (**self).open_document();
    }

    fn close_document(&mut self) {
        (**self).close_document();
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        (**self).open_tag(name, attributes);
    }

    fn close_tag(&mut self, name: &str) {
        (**self).close_tag(name);
    }

    fn text(&mut self, text: &str) {
        (**self).text(text);
    }
}

/// An owned event, as recorded by [`VecSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Open(String, Vec<Attribute>),
    Close(String),
    Text(String),
}

/// Records events; adjacent text events are merged.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<Event>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventSink for VecSink {
    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        self.events.push(Event::Open(name.to_string(), attributes));
    }

    fn close_tag(&mut self, name: &str) {
        self.events.push(Event::Close(name.to_string()));
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Event::Text(last)) = self.events.last_mut() {
            last.push_str(text);
        } else {
            self.events.push(Event::Text(text.to_string()));
        }
    }
}

/// Compact one-line rendering used in test assertions: `<a href="x">`, `</a>`, `"text"`.
pub fn format_events(events: &[Event]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::Open(name, attributes) => {
                out.push('<');
                out.push_str(name);
                for attribute in attributes {
                    out.push_str(&format!(" {}={:?}", attribute.name, attribute.value));
                }
                out.push('>');
            }
            Event::Close(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Event::Text(text) => out.push_str(&format!("{text:?}")),
        }
    }
    out
}
