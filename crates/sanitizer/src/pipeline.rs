use crate::filter::PolicyFilter;
use crate::policy::Policy;
use crate::processor::chain;
use crate::render::Renderer;
use html::{ErrorSink, EventSink, IgnoreErrors, parse_events};
use std::fmt;

impl Policy {
    /// Sanitize `input` into a new string.
    pub fn sanitize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        // Writing into a String cannot fail.
        let _ = self.sanitize_to(input, &mut out);
        out
    }

    /// Sanitize `input` into `out`, stopping at the first write error.
    pub fn sanitize_to<W: fmt::Write>(&self, input: &str, out: &mut W) -> fmt::Result {
        self.sanitize_with_errors(input, out, &mut IgnoreErrors)
    }

    /// Like [`Policy::sanitize_to`], reporting lexing and nesting anomalies
    /// to `errors`.
    pub fn sanitize_with_errors<W: fmt::Write>(
        &self,
        input: &str,
        out: &mut W,
        errors: &mut dyn ErrorSink,
    ) -> fmt::Result {
        let mut renderer = Renderer::new(out);
        {
            let rendered = chain(self.postprocessors(), Box::new(&mut renderer));
            let filter = PolicyFilter::new(self, rendered);
            let mut sink = chain(self.preprocessors(), Box::new(filter));
            sink.open_document();
            parse_events(input, self.balancer_config(), errors, &mut sink);
            sink.close_document();
        }
        renderer.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::PolicyBuilder;
    use html::ParseError;

    #[test]
    fn soupy_markup_is_balanced() {
        let policy = PolicyBuilder::new().allow_elements(["b", "i"]).build().unwrap();
        assert_eq!(
            policy.sanitize("<b style=x>Fancy</b> with <i><b>soupy</i> tags</b>."),
            "<b>Fancy</b> with <i><b>soupy</b></i><b> tags</b>."
        );
    }

    #[test]
    fn anomalies_reach_the_error_sink() {
        let policy = PolicyBuilder::new().build().unwrap();
        let mut errors: Vec<ParseError> = Vec::new();
        let mut out = String::new();
        policy
            .sanitize_with_errors("a &bogus; <b", &mut out, &mut errors)
            .unwrap();
        assert_eq!(out, "a &amp;bogus; ");
        assert!(!errors.is_empty());
    }

    #[test]
    fn write_errors_propagate() {
        struct Full;
        impl std::fmt::Write for Full {
            fn write_str(&mut self, _: &str) -> std::fmt::Result {
                Err(std::fmt::Error)
            }
        }
        let policy = PolicyBuilder::new().build().unwrap();
        assert!(policy.sanitize_to("text", &mut Full).is_err());
    }
}
