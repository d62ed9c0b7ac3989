//! Advisory parse errors for lexing and structural repair.
//!
//! Errors never abort processing. They are reported to an optional
//! [`ErrorSink`] and mirrored to the `log` facade at debug level.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    /// A tag was still open when the input ended; the tag is dropped.
    UnterminatedTag,
    UnterminatedComment,
    /// A raw-text element never saw its close tag; content runs to end of input.
    UnterminatedRawText,
    /// `<!...>`, `<?...>` or `</` followed by a non-letter.
    BogusComment,
    MalformedCharacterReference,
    /// An end tag with no matching open element in scope.
    StrayEndTag,
    /// The open-element stack hit its configured cap.
    NestingTooDeep,
}

impl ParseErrorCode {
    pub fn description(self) -> &'static str {
        match self {
            ParseErrorCode::UnterminatedTag => "tag not closed before end of input",
            ParseErrorCode::UnterminatedComment => "comment not closed before end of input",
            ParseErrorCode::UnterminatedRawText => "raw text element not closed",
            ParseErrorCode::BogusComment => "bogus comment",
            ParseErrorCode::MalformedCharacterReference => "malformed character reference",
            ParseErrorCode::StrayEndTag => "end tag without matching open element",
            ParseErrorCode::NestingTooDeep => "element nesting too deep",
        }
    }
}

/// A recoverable anomaly, positioned by byte offset into the input.
///
/// Structural errors raised after lexing carry the offset of the token that
/// triggered them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} at byte {position}", code.description())]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub position: usize,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, position: usize) -> Self {
        Self { code, position }
    }
}

/// Receiver for advisory parse errors.
///
/// Implementations must not assume any particular call count or order beyond
/// document order; sanitization completes regardless of what they do.
pub trait ErrorSink {
    fn report(&mut self, error: ParseError);
}

impl<F> ErrorSink for F
where
    F: FnMut(ParseError),
{
    fn report(&mut self, error: ParseError) {
        self(error)
    }
}

impl ErrorSink for Vec<ParseError> {
    fn report(&mut self, error: ParseError) {
        self.push(error);
    }
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreErrors;

impl ErrorSink for IgnoreErrors {
    fn report(&mut self, _error: ParseError) {}
}

pub(crate) fn report(
    errors: &mut dyn ErrorSink,
    target: &str,
    code: ParseErrorCode,
    position: usize,
) {
    log::debug!(target: target, "{} at byte {position}", code.description());
    errors.report(ParseError::new(code, position));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_vectors_collect_reports() {
        let mut seen = Vec::new();
        {
            let mut sink = |error: ParseError| seen.push(error.code);
            report(&mut sink, "test", ParseErrorCode::StrayEndTag, 3);
        }
        assert_eq!(seen, vec![ParseErrorCode::StrayEndTag]);

        let mut collected: Vec<ParseError> = Vec::new();
        report(&mut collected, "test", ParseErrorCode::BogusComment, 7);
        assert_eq!(collected[0].to_string(), "bogus comment at byte 7");
    }
}
