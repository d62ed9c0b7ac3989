use html::{Attribute, EventSink};

/// A stage that rewrites the event stream by wrapping the next sink.
///
/// Preprocessors see the normalized input before the policy runs, so their
/// output is still filtered. Postprocessors see the filtered stream and
/// their output goes to the renderer unchecked.
pub trait EventProcessor: Send + Sync {
    fn wrap<'a>(&self, next: Box<dyn EventSink + 'a>) -> Box<dyn EventSink + 'a>;
}

/// Build a chain where the first processor receives events first and each
/// later one sees the output of the one before it.
pub(crate) fn chain<'a, 'p>(
    processors: impl DoubleEndedIterator<Item = &'p dyn EventProcessor>,
    sink: Box<dyn EventSink + 'a>,
) -> Box<dyn EventSink + 'a> {
    processors.rev().fold(sink, |next, processor| processor.wrap(next))
}

/// Rewrites element names on open and close; handy for processors that
/// only rename.
pub struct RenameElements<F> {
    rename: F,
}

impl<F> RenameElements<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync + Clone,
{
    pub fn new(rename: F) -> Self {
        Self { rename }
    }
}

struct RenameSink<'a, F> {
    rename: F,
    next: Box<dyn EventSink + 'a>,
}

impl<F> EventSink for RenameSink<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn open_document(&mut self) {
        self.next.open_document();
    }

    fn close_document(&mut self) {
        self.next.close_document();
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        match (self.rename)(name) {
            Some(renamed) => self.next.open_tag(&renamed, attributes),
            None => self.next.open_tag(name, attributes),
        }
    }

    fn close_tag(&mut self, name: &str) {
        match (self.rename)(name) {
            Some(renamed) => self.next.close_tag(&renamed),
            None => self.next.close_tag(name),
        }
    }

    fn text(&mut self, text: &str) {
        self.next.text(text);
    }
}

impl<F> EventProcessor for RenameElements<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync + Clone + 'static,
{
    fn wrap<'a>(&self, next: Box<dyn EventSink + 'a>) -> Box<dyn EventSink + 'a> {
        Box::new(RenameSink {
            rename: self.rename.clone(),
            next,
        })
    }
}

/// Rewrites every text event.
pub struct MapText<F> {
    map: F,
}

impl<F> MapText<F>
where
    F: Fn(&str) -> String + Send + Sync + Clone,
{
    pub fn new(map: F) -> Self {
        Self { map }
    }
}

struct MapTextSink<'a, F> {
    map: F,
    next: Box<dyn EventSink + 'a>,
}

impl<F> EventSink for MapTextSink<'_, F>
where
    F: Fn(&str) -> String,
{
    fn open_document(&mut self) {
        self.next.open_document();
    }

    fn close_document(&mut self) {
        self.next.close_document();
    }

    fn open_tag(&mut self, name: &str, attributes: Vec<Attribute>) {
        self.next.open_tag(name, attributes);
    }

    fn close_tag(&mut self, name: &str) {
        self.next.close_tag(name);
    }

    fn text(&mut self, text: &str) {
        let mapped = (self.map)(text);
        self.next.text(&mapped);
    }
}

impl<F> EventProcessor for MapText<F>
where
    F: Fn(&str) -> String + Send + Sync + Clone + 'static,
{
    fn wrap<'a>(&self, next: Box<dyn EventSink + 'a>) -> Box<dyn EventSink + 'a> {
        Box::new(MapTextSink {
            map: self.map.clone(),
            next,
        })
    }
}
